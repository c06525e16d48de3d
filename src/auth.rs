// src/auth.rs

use reqwest::header::HeaderValue;

use crate::errors::AppError;

/// Kapabilność dostarczająca token dostępu.
///
/// Fabryka klienta dostaje magazyn poświadczeń jako parametr zamiast czytać
/// globalny stan procesu — testy podstawiają [`StaticCredentialStore`].
pub trait CredentialStore: Send + Sync {
    /// Zwraca aktualny token albo `None`, gdy użytkownik nie jest zalogowany.
    fn access_token(&self) -> Option<String>;
}

/// Odczytuje token ze zmiennej środowiskowej `ACCESS_TOKEN`
/// (ładowanej także z `.env` przez dotenvy przy starcie binarki).
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn access_token(&self) -> Option<String> {
        std::env::var("ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Stały token — dla testów i skryptów jednorazowych.
pub struct StaticCredentialStore {
    token: Option<String>,
}

impl StaticCredentialStore {
    pub fn new(token: Option<&str>) -> Self {
        StaticCredentialStore {
            token: token.map(|t| t.to_string()),
        }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Buduje wartość nagłówka `authorization`.
///
/// Brak tokenu daje pusty nagłówek — klient pozostaje nieuwierzytelniony,
/// a ewentualny błąd autoryzacji zgłosi dopiero serwer.
pub fn bearer_header_value(token: Option<&str>) -> Result<HeaderValue, AppError> {
    match token {
        Some(token) => HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            AppError::Internal(format!("Token nie nadaje się na nagłówek HTTP: {}", e))
        }),
        None => Ok(HeaderValue::from_static("")),
    }
}
