// src/client.rs

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::auth::{CredentialStore, bearer_header_value};
use crate::errors::AppError;
use crate::models::{ProductData, ProductResponse, UpdatePayload};
use crate::state::AppConfig;

/// Buduje skonfigurowanego klienta HTTP: adres bazowy wynika z konfiguracji,
/// token pochodzi z wstrzykniętego magazynu poświadczeń, a domyślny
/// content-type jest ustawiony pod payloady multipart.
///
/// Operacja sama nie zgłasza błędów poza awarią budowania klienta; brak
/// tokenu daje po prostu klienta nieuwierzytelnionego. Jeden klient na
/// proces — binarka buduje go raz i przekazuje dalej.
pub fn create_client(
    config: &AppConfig,
    credentials: &dyn CredentialStore,
) -> Result<Client, AppError> {
    let token = credentials.access_token();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
    headers.insert(AUTHORIZATION, bearer_header_value(token.as_deref())?);

    tracing::debug!(
        "Budowanie klienta HTTP: środowisko={}, token obecny={}",
        config.environment,
        token.is_some()
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| AppError::Internal(format!("Nie można zbudować klienta HTTP: {}", e)))
}

/// Operacje API produktów, za którymi stoi kontroler formularza.
/// Trait istnieje po to, by testy mogły podstawić atrapę bez sieci.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn fetch_product(&self, product_id: &str) -> Result<ProductData, AppError>;
    async fn update_product(&self, product_id: &str, payload: UpdatePayload)
    -> Result<(), AppError>;
}

/// Implementacja [`ProductApi`] na bazie reqwest.
pub struct HttpProductApi {
    client: Client,
    base_url: Url,
}

impl HttpProductApi {
    pub fn new(config: &AppConfig, credentials: &dyn CredentialStore) -> Result<Self, AppError> {
        Ok(HttpProductApi {
            client: create_client(config, credentials)?,
            base_url: config.base_url().clone(),
        })
    }
}

fn request_url(base_url: &Url, product_id: &str) -> String {
    format!("{}/products/{}", base_url, product_id)
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn fetch_product(&self, product_id: &str) -> Result<ProductData, AppError> {
        let url = request_url(&self.base_url, product_id);
        tracing::info!("Pobieranie produktu: GET {}", url);

        let response_result = self.client.get(&url).send().await;

        match response_result {
            Ok(resp) => {
                if resp.status().is_success() {
                    match resp.json::<ProductResponse>().await {
                        Ok(body) => Ok(body.data),
                        Err(e) => {
                            tracing::error!(
                                "Błąd deserializacji odpowiedzi dla produktu {}: {}",
                                product_id,
                                e
                            );
                            Err(AppError::Fetch(
                                "Nie można przetworzyć odpowiedzi serwera".to_string(),
                            ))
                        }
                    }
                } else {
                    let status = resp.status();
                    let error_text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "Brak treści błędu".to_string());
                    tracing::error!(
                        "Błąd pobierania produktu {}: Status={}, Treść={}",
                        product_id,
                        status,
                        error_text
                    );
                    Err(AppError::Fetch(format!("Serwer zwrócił status {}", status)))
                }
            }
            Err(e) => {
                tracing::error!("Błąd sieci podczas pobierania produktu {}: {}", product_id, e);
                Err(AppError::Fetch(format!("Błąd połączenia z serwerem: {}", e)))
            }
        }
    }

    async fn update_product(
        &self,
        product_id: &str,
        payload: UpdatePayload,
    ) -> Result<(), AppError> {
        let url = request_url(&self.base_url, product_id);
        let form = payload.into_multipart()?;
        tracing::info!("Aktualizacja produktu: PUT {}", url);

        let response_result = self.client.put(&url).multipart(form).send().await;

        match response_result {
            Ok(resp) => {
                if resp.status().is_success() {
                    tracing::info!(
                        "Produkt {} zaktualizowany, status: {}",
                        product_id,
                        resp.status()
                    );
                    Ok(())
                } else {
                    let status = resp.status();
                    let error_text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "Brak treści błędu".to_string());
                    tracing::error!(
                        "Błąd aktualizacji produktu {}: Status={}, Treść={}",
                        product_id,
                        status,
                        error_text
                    );
                    Err(AppError::Submit(format!("Serwer zwrócił status {}", status)))
                }
            }
            Err(e) => {
                tracing::error!(
                    "Błąd sieci podczas aktualizacji produktu {}: {}",
                    product_id,
                    e
                );
                Err(AppError::Submit(format!("Błąd połączenia z serwerem: {}", e)))
            }
        }
    }
}
