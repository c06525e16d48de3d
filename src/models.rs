// src/models.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::Display;
use validator::{Validate, ValidationError};

use crate::errors::AppError;

/// Dane produktu zwracane przez API w polu `data`.
///
/// Pola `series` i `url` bywają pomijane przez serwer — po stronie klienta
/// dostają domyślnie pusty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub photo: Option<String>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub series: String,
    pub description: String,
    #[serde(default)]
    pub url: String,
}

/// Koperta odpowiedzi `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub data: ProductData,
}

// --- STAN FORMULARZA ---

/// Lokalna, edytowalna kopia pól produktu.
///
/// Wypełniana wyłącznie po udanym odczycie; dopóki ładowanie się nie
/// powiedzie, formularz pozostaje pusty i nigdy nie trafia do sieci.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct EditableForm {
    pub photo: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Pole 'name' jest wymagane"))]
    pub name: String,

    #[validate(custom(function = "validate_not_blank", message = "Pole 'category' jest wymagane"))]
    pub category: String,

    pub series: String,

    #[validate(custom(
        function = "validate_not_blank",
        message = "Pole 'description' jest wymagane"
    ))]
    pub description: String,

    pub url: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

impl From<ProductData> for EditableForm {
    fn from(data: ProductData) -> Self {
        EditableForm {
            photo: data.photo,
            name: data.name,
            category: data.category,
            series: data.series,
            description: data.description,
            url: data.url,
        }
    }
}

/// Pojedyncza zmiana jednego pola formularza.
///
/// Wartość niesiona przez wariant pochodzi wprost ze zdarzenia widżetu
/// (input, dropdown kategorii, edytor opisu) i jest jedynym źródłem prawdy
/// dla tego pola przy scalaniu — reduktor nigdy nie sięga po starszą wartość.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPatch {
    Name(String),
    Category(String),
    Series(String),
    Description(String),
    Url(String),
}

impl EditableForm {
    /// Zwraca nowy formularz z podmienionym dokładnie jednym polem.
    pub fn with_patch(&self, patch: FormPatch) -> EditableForm {
        let mut next = self.clone();
        match patch {
            FormPatch::Name(value) => next.name = value,
            FormPatch::Category(value) => next.category = value,
            FormPatch::Series(value) => next.series = value,
            FormPatch::Description(value) => next.description = value,
            FormPatch::Url(value) => next.url = value,
        }
        next
    }
}

// --- ZDJĘCIE ---

/// Nowe zdjęcie wybrane przez użytkownika, jeszcze nie wysłane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    /// Wczytuje zdjęcie z dysku jako nowy upload.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::Internal(format!("Nie można odczytać pliku '{}': {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.jpg")
            .to_string();
        Ok(PendingUpload { filename, bytes })
    }
}

/// Źródło pola `photo` w wysyłanym payloadzie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// Nowy plik wybrany w tej sesji edycji.
    Upload(PendingUpload),
    /// Referencja do zdjęcia już zapisanego na serwerze.
    Existing(String),
}

/// Rozstrzyga, które zdjęcie trafi do payloadu.
///
/// Zasada pierwszeństwa: nowy upload > istniejąca referencja > brak pola.
pub fn resolve_photo_source(
    pending_upload: Option<PendingUpload>,
    existing_photo: Option<String>,
) -> Option<PhotoSource> {
    if let Some(upload) = pending_upload {
        return Some(PhotoSource::Upload(upload));
    }
    existing_photo.map(PhotoSource::Existing)
}

// --- PAYLOAD AKTUALIZACJI ---

/// Typowany payload `PUT /products/{id}`.
///
/// Pola tekstowe są dołączane zawsze (pusty string jest dozwolony dla
/// `series` i `url`); pole `photo` podlega zasadzie pierwszeństwa z
/// [`resolve_photo_source`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    pub photo: Option<PhotoSource>,
    pub name: String,
    pub category: String,
    pub series: String,
    pub description: String,
    pub url: String,
}

impl UpdatePayload {
    pub fn from_form(form: &EditableForm, pending_upload: Option<PendingUpload>) -> Self {
        UpdatePayload {
            photo: resolve_photo_source(pending_upload, form.photo.clone()),
            name: form.name.clone(),
            category: form.category.clone(),
            series: form.series.clone(),
            description: form.description.clone(),
            url: form.url.clone(),
        }
    }

    /// Składa body multipart dla żądania aktualizacji.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, AppError> {
        let mut form_data = reqwest::multipart::Form::new();

        match self.photo {
            Some(PhotoSource::Upload(upload)) => {
                let part = reqwest::multipart::Part::bytes(upload.bytes)
                    .file_name(upload.filename)
                    .mime_str("image/*")
                    .map_err(|e| {
                        tracing::error!("Błąd ustawiania typu MIME: {}", e);
                        AppError::Internal(
                            "Wewnętrzny błąd podczas przygotowania pliku".to_string(),
                        )
                    })?;
                form_data = form_data.part("photo", part);
            }
            Some(PhotoSource::Existing(reference)) => {
                form_data = form_data.text("photo", reference);
            }
            None => {}
        }

        Ok(form_data
            .text("name", self.name)
            .text("category", self.category)
            .text("series", self.series)
            .text("description", self.description)
            .text("url", self.url))
    }
}

// --- MASZYNY STANÓW WIDOKU ---

/// Stan ładowania danych; `Loaded` i `Failed` są terminalne — wyjście
/// tylko przez nowy kontroler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed,
}

/// Blokada podwójnego wysłania i źródło wskaźnika zajętości.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SubmitState {
    Idle,
    Submitting,
}
