//! Identity layer: bearer-token issue/validate, token-to-user resolution and
//! the access predicates the repositories rely on.
//! Keep the public surface thin and split implementation across sub-modules.

mod token;
mod resolver;
mod guard;

pub use token::{Claims, TokenService, TOKEN_VALIDITY_HOURS};
pub use resolver::resolve_identity;
pub use guard::{authenticate, bearer_token, can_mutate, require_admin};
