use crate::{error::RelayError, params::Params};

/// Picks the caller's token: the `token` parameter first, then the
/// `Authorization` header with an optional `Bearer ` prefix.
pub fn extract_token<'a>(params: &'a Params, authorization: Option<&'a str>) -> Option<&'a str> {
    if let Some(token) = params.get("token").filter(|t| !t.is_empty()) {
        return Some(token.as_str());
    }

    let header = authorization.filter(|h| !h.is_empty())?;
    let parts: Vec<&str> = header.split(' ').collect();

    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Some(*token),
        _ => Some(header),
    }
}

pub fn authenticate(
    params: &Params,
    authorization: Option<&str>,
    secret: &str,
) -> Result<(), RelayError> {
    if params.has_non_text_token() {
        return Err(RelayError::Unauthorized);
    }

    match extract_token(params, authorization) {
        Some(token) if token == secret => Ok(()),
        _ => Err(RelayError::Unauthorized),
    }
}
