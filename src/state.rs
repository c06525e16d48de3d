// src/state.rs

use once_cell::sync::Lazy;
use strum_macros::{Display, EnumString};
use url::Url;

static LOCAL_BASE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost:3000/api").expect("stały lokalny adres API jest poprawny")
});

static PRODUCTION_BASE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://api.vintedly.pl/api").expect("stały produkcyjny adres API jest poprawny")
});

/// Środowisko uruchomieniowe panelu.
///
/// Rozstrzygane RAZ przy starcie aplikacji (zmienna środowiskowa albo
/// detekcja po hoście) i przekazywane dalej jako wartość — biblioteka
/// nigdy nie zgaduje środowiska ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    /// Klasyfikuje adres hosta: pętla zwrotna i hosty deweloperskie to
    /// `Local`, wszystko inne to `Production`.
    pub fn detect(host: &str) -> Self {
        let host = host.trim();
        if host == "localhost"
            || host == "127.0.0.1"
            || host.starts_with("localhost:")
            || host.starts_with("127.0.0.1:")
            || host.ends_with(".local")
        {
            Environment::Local
        } else {
            Environment::Production
        }
    }
}

/// Konfiguracja klienta zbudowana przy starcie i przekazywana w dół.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
}

impl AppConfig {
    pub fn new(environment: Environment) -> Self {
        AppConfig { environment }
    }

    /// Stały adres bazowy API dla wybranego środowiska.
    pub fn base_url(&self) -> &Url {
        match self.environment {
            Environment::Local => &LOCAL_BASE_URL,
            Environment::Production => &PRODUCTION_BASE_URL,
        }
    }
}
