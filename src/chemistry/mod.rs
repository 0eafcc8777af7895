//! # Chemistry Module
//!
//! Elemental formula arithmetic used by the chain library and the fragment predictor.
//!
//! Fragment formulas are derived from the precursor and chain formulas by adding and
//! subtracting elemental compositions, so the arithmetic has to stay exact (integer
//! atom counts) and only converts to masses at the very end.
//!
//! ## Notation
//!
//! Formulas are written Hill-style without separators, e.g. `C42H83NO8P`.
//! Stable isotopes use dedicated symbols:
//!
//! | Symbol | Isotope |
//! |--------|---------|
//! | `D`    | ²H (deuterium) |
//! | `Cc`   | ¹³C |
//! | `Nn`   | ¹⁵N |
//!
//! ```rust
//! use lipidmsn::chemistry::ElementalFormula;
//!
//! let precursor: ElementalFormula = "C42H83NO8P".parse()?;
//! let fatty_acid: ElementalFormula = "C16H32O2".parse()?;
//! let loss = precursor.checked_sub(&fatty_acid)?;
//! assert_eq!(loss.to_string(), "C26H51NO6P");
//! # Ok::<(), lipidmsn::chemistry::FormulaError>(())
//! ```

mod element;
mod error;
mod formula;
mod label;


pub use element::{Element, ELECTRON_MASS};
pub use error::FormulaError;
pub use formula::ElementalFormula;
pub use label::IsotopeLabel;
