//! Identity propagation and access control gates.

use serde_json::json;

use crate::context::IdentityContext;
use crate::error::AuthError;
use crate::token::TokenCodec;

/// Result of evaluating a gate against the current identity context.
///
/// The two rejection arms are deliberately distinct: `Deny` writes the
/// response itself, `Forward` hands a structured error to the pipeline's
/// failure channel. `require_login` and `require_admin` reject through
/// different arms and the difference is observable to clients.
#[derive(Debug)]
pub enum GateOutcome {
    /// Let the pipeline continue to the next stage.
    Proceed,
    /// Short-circuit with a direct response.
    Deny {
        /// HTTP status code to write.
        status: u16,
        /// JSON body to write.
        body: serde_json::Value,
    },
    /// Hand a structured error to the failure channel.
    Forward(AuthError),
}

/// Resolves the identity context for a request carrying an optional token.
///
/// No token is not an error: the request proceeds anonymously with no
/// identity fields attached. A token that decodes to no payload fails with
/// [`AuthError::FailedDecode`]; an error raised by the decoder propagates
/// unchanged.
pub fn resolve_identity(
    codec: &dyn TokenCodec,
    token: Option<&str>,
) -> Result<IdentityContext, AuthError> {
    let Some(token) = token else {
        return Ok(IdentityContext::anonymous());
    };

    match codec.decode(token)? {
        Some(claims) => Ok(IdentityContext::from_claims(&claims)),
        None => Err(AuthError::FailedDecode),
    }
}

/// Gate: the caller must be logged in.
///
/// Rejections are written directly as a 401 response with
/// `{"error": "Not authenticated"}`; the next stage is not invoked.
pub fn require_login(ctx: &IdentityContext) -> GateOutcome {
    if ctx.is_authenticated() {
        GateOutcome::Proceed
    } else {
        GateOutcome::Deny {
            status: 401,
            body: json!({ "error": "Not authenticated" }),
        }
    }
}

/// Gate: the caller must be an admin.
///
/// Rejections are forwarded to the failure channel as
/// [`AuthError::Unauthorized`]; this gate never writes the response itself.
pub fn require_admin(ctx: &IdentityContext) -> GateOutcome {
    if ctx.is_admin() {
        GateOutcome::Proceed
    } else {
        GateOutcome::Forward(AuthError::Unauthorized)
    }
}
