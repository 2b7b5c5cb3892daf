//! Instance validation and automatic classification over a type lattice.
//!
//! The two entry points mirror how schema tooling consumes the engine:
//!
//! - [`validate`] checks an instance against a type, scanning known
//!   subtypes first and honoring discriminator verdicts, and returns a
//!   path-annotated [`Status`] tree.
//! - [`ac`] resolves which concrete member of a polymorphic/union family
//!   an untyped instance represents, falling back to the `nothing`
//!   sentinel when no member (or more than one indistinguishable member)
//!   fits.
//!
//! Validation is a pure function of (type graph, instance): all state that
//! was historically ambient (the auto-close flag, the currently-validated
//! type marker) lives in a call-scoped [`Validator`], so concurrent
//! validations over one store cannot corrupt each other.

mod validate;
pub use validate::{Validator, validate, validate_direct, validate_with};

mod check;

mod discriminator;
pub use discriminator::{DiscriminatorVerdict, check_discriminator};

mod classify;
pub use classify::{ac, can_do_ac};

pub use typefit_common::{Severity, Status, ValidationPath};
