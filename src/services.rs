// src/services.rs

/// Powiadomienia widoczne dla użytkownika — odpowiednik toastów w panelu.
/// Wywołania są typu "wyślij i zapomnij", kontroler nie konsumuje wyniku.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Sygnał nawigacji; wywoływany wyłącznie po udanym zapisie.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Domyślny notifier CLI — toasty lądują w logu.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Domyślna nawigacja CLI — w terminalu nie ma dokąd przejść,
/// więc sygnał jest tylko logowany.
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate_to(&self, path: &str) {
        tracing::info!("Przekierowanie do: {}", path);
    }
}
