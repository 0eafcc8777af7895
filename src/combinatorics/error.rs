use super::HydroxylRange;

/// Errors raised while decomposing an analyte into chains
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombinatoricsError {
    /// The hydroxylation total cannot be split over the declared chains
    #[error(
        "Cannot distribute {requested} hydroxylation site(s) over {fa_chains} FA chain(s) \
         ({fa_range} per chain) and {lcb_chains} LCB chain(s) ({lcb_range} per chain)"
    )]
    ConstraintUnsatisfiable {
        /// Requested hydroxylation total
        requested: u32,
        /// Number of FA-type chains
        fa_chains: usize,
        /// Number of long-chain bases
        lcb_chains: usize,
        /// Per-chain FA range
        fa_range: HydroxylRange,
        /// Per-chain LCB range
        lcb_range: HydroxylRange,
    },
}
