//! Cylindrical algebraic decomposition for nonlinear real arithmetic.
//!
//! A [`Cad`] decides conjunctions of polynomial sign conditions
//! ([`Constraint`]) over the reals. It projects its polynomials level by
//! level ([`EliminationSet`], [`Projection`]) and lifts sample points over
//! the resulting decomposition ([`SampleTree`]), one variable at a time.
//! Both directions are interleaved and incremental: successive checks reuse
//! the elimination and every sample constructed so far.
//!
//! ```ignore
//! use cadkit_cad::{Cad, Constraint};
//! use cadkit_math::{Polynomial, Sign};
//!
//! let mut cad = Cad::new();
//! // x^2 + y^2 - 1 = 0 and x - y = 0
//! let circle = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
//! let line = Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
//! let answer = cad.check(&[
//!     Constraint::new(circle, Sign::Zero, vec![0, 1]),
//!     Constraint::new(line, Sign::Zero, vec![0, 1]),
//! ])?;
//! assert!(answer.is_sat());
//! ```
//!
//! Unsatisfiable checks can explain themselves through a
//! [`ConflictGraph`] and the bounds passed in; see [`Cad::check_full`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cad;
pub mod conflict_graph;
pub mod constraint;
pub mod elimination_set;
pub mod error;
pub mod observer;
pub mod projection;
pub mod sample_set;
pub mod sample_tree;
pub mod settings;

pub use cad::{Answer, BoundMap, Cad, CadStats, CheckOptions, Deductions};
pub use conflict_graph::{ConflictGraph, SelectionGraph, Vertex};
pub use constraint::{CadConstraints, Constraint};
pub use elimination_set::{EliminationSet, PolyId, Provenance};
pub use error::{CadError, CadResult};
pub use observer::{CadObserver, DotObserver, NoopObserver};
pub use projection::{Projection, ProjectionOperator, ProjectionSink, ProjectionStats};
pub use sample_set::{SampleId, SampleSet};
pub use sample_tree::{NodeId, SampleNode, SampleTree};
pub use settings::{CadSettings, IntegerHandling, PolynomialOrder, Preset};
