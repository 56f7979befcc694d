//! JWT authentication for the marketplace API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::db::users::{User, UserRole};
use crate::error::AppError;
use crate::state::AppState;

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Account kind (consumidor | vendedor)
    pub tipo: UserRole,
    /// Display name
    pub nome: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from JWT
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub role: UserRole,
    pub nome: String,
}

impl CurrentUser {
    pub fn is_seller(&self) -> bool {
        self.role == UserRole::Vendedor
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a user
pub fn create_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.id,
        tipo: user.tipo_usuario,
        nome: user.nome_completo.clone(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a token, returning its claims
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(crate::error::ErrorCode::TokenExpired),
            _ => AppError::new(crate::error::ErrorCode::TokenInvalid),
        }
    })
}

/// Middleware that extracts and verifies the JWT from the Authorization header
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let claims = decode_token(token, &state.jwt_secret).map_err(|e| e.into_response())?;

    let identity = CurrentUser {
        id: claims.sub,
        role: claims.tipo,
        nome: claims.nome,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn test_user(role: UserRole) -> User {
        User {
            id: 42,
            nome_completo: "Maria da Silva".into(),
            email: "maria@example.com".into(),
            senha_hash: String::new(),
            cpf_cnpj: "12345678901".into(),
            telefone: None,
            tipo_usuario: role,
            nome_negocio: None,
            descricao_negocio: None,
            logo_url: None,
            criado_em: 0,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let user = test_user(UserRole::Vendedor);
        let token = create_token(&user, "test-secret").unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.tipo, UserRole::Vendedor);
        assert_eq!(claims.nome, "Maria da Silva");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = test_user(UserRole::Consumidor);
        let token = create_token(&user, "secret-a").unwrap();
        let err = decode_token(&token, "secret-b").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = decode_token("not.a.token", "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
