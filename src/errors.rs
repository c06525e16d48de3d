// src/errors.rs

use thiserror::Error;

/// Błędy klienta panelu administracyjnego.
///
/// `Fetch` kończy cykl życia formularza (brak ścieżki ponowienia),
/// `Validation` i `Submit` są odwracalne — stan lokalny zostaje zachowany.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Błąd pobierania danych produktu: {0}")]
    Fetch(String),

    #[error("Błąd walidacji danych: {0}")]
    Validation(String),

    #[error("Błąd wysyłania aktualizacji: {0}")]
    Submit(String),

    #[error("Wewnętrzny błąd klienta: {0}")]
    Internal(String),
}
