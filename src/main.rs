// src/main.rs

use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_admin_client::auth::EnvCredentialStore;
use shop_admin_client::client::HttpProductApi;
use shop_admin_client::form::FormController;
use shop_admin_client::models::{FormPatch, LoadState, PendingUpload};
use shop_admin_client::services::{TracingNavigator, TracingNotifier};
use shop_admin_client::state::{AppConfig, Environment};

const USAGE: &str =
    "Użycie: shop_admin_client <id-produktu> [pole=wartość ...] [--photo <ścieżka>]\n\
     Edytowalne pola: name, category, series, description, url";

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_admin_client=debug".into()), // Ustaw poziom logowania, np. RUST_LOG=info
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args().skip(1);
    let Some(product_id) = args.next() else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    // --- Edycje pól i ewentualne nowe zdjęcie z argumentów ---
    let mut patches: Vec<FormPatch> = Vec::new();
    let mut photo_path: Option<String> = None;
    while let Some(arg) = args.next() {
        if arg == "--photo" {
            match args.next() {
                Some(path) => photo_path = Some(path),
                None => {
                    eprintln!("Brak ścieżki po '--photo'\n{}", USAGE);
                    return ExitCode::FAILURE;
                }
            }
        } else if let Some((key, value)) = arg.split_once('=') {
            let patch = match key {
                "name" => FormPatch::Name(value.to_string()),
                "category" => FormPatch::Category(value.to_string()),
                "series" => FormPatch::Series(value.to_string()),
                "description" => FormPatch::Description(value.to_string()),
                "url" => FormPatch::Url(value.to_string()),
                _ => {
                    tracing::warn!("Pomijam nieznane pole '{}'", key);
                    continue;
                }
            };
            patches.push(patch);
        } else {
            tracing::warn!("Pomijam niezrozumiały argument '{}'", arg);
        }
    }

    // --- Konfiguracja środowiska ---
    // Środowisko rozstrzygamy raz, przy starcie: jawna zmienna ma
    // pierwszeństwo przed detekcją po nazwie hosta.
    let environment = match env::var("SHOP_ADMIN_ENV") {
        Ok(value) => match Environment::from_str(&value) {
            Ok(environment) => environment,
            Err(_) => {
                tracing::error!(
                    "Nieprawidłowa wartość SHOP_ADMIN_ENV: '{}' (dozwolone: local, production)",
                    value
                );
                return ExitCode::FAILURE;
            }
        },
        Err(_) => Environment::detect(&env::var("HOSTNAME").unwrap_or_default()),
    };
    let config = AppConfig::new(environment);
    tracing::info!("Środowisko: {}, API: {}", environment, config.base_url());

    // Klient HTTP budowany raz na proces; token czytany z ACCESS_TOKEN
    let api = match HttpProductApi::new(&config, &EnvCredentialStore) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Nie można zbudować klienta API: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controller = FormController::new(
        api,
        Arc::new(TracingNotifier),
        Arc::new(TracingNavigator),
        product_id,
    );

    controller.load().await;
    if controller.load_state() != LoadState::Loaded {
        return ExitCode::FAILURE;
    }

    for patch in patches {
        controller.apply(patch);
    }

    if let Some(path) = photo_path {
        match PendingUpload::from_file(&path).await {
            Ok(upload) => controller.set_pending_upload(upload),
            Err(e) => {
                tracing::error!("Nie można wczytać zdjęcia '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    }

    controller.submit().await;
    ExitCode::SUCCESS
}
