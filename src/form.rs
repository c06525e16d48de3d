// src/form.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use validator::Validate;

use crate::client::ProductApi;
use crate::errors::AppError;
use crate::models::{
    EditableForm, FormPatch, LoadState, PendingUpload, SubmitState, UpdatePayload,
};
use crate::services::{Navigator, Notifier};

/// Widok listy produktów, na który wracamy po udanym zapisie.
pub const PRODUCT_LIST_PATH: &str = "/product";

const LOAD_ERROR_MESSAGE: &str = "Nie udało się pobrać danych produktu. Spróbuj ponownie.";
const VALIDATION_ERROR_MESSAGE: &str = "Uzupełnij wszystkie wymagane pola.";
const SUBMIT_SUCCESS_MESSAGE: &str = "Pomyślnie zaktualizowano produkt.";
const SUBMIT_ERROR_MESSAGE: &str = "Błąd podczas aktualizacji produktu. Spróbuj ponownie.";

struct FormState {
    form: EditableForm,
    pending_upload: Option<PendingUpload>,
    load_state: LoadState,
    submit_state: SubmitState,
}

/// Kontroler cyklu odczyt → edycja → zapis jednego produktu.
///
/// Stan siedzi za mutexem, więc jeden kontroler (w `Arc`) może obsługiwać
/// współbieżne zdarzenia UI; blokada nigdy nie jest trzymana przez await.
/// Każdy zamontowany widok edycji ma własny, niezależny kontroler.
pub struct FormController {
    api: Arc<dyn ProductApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    product_id: String,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn new(
        api: Arc<dyn ProductApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        product_id: impl Into<String>,
    ) -> Self {
        FormController {
            api,
            notifier,
            navigator,
            product_id: product_id.into(),
            state: Mutex::new(FormState {
                form: EditableForm::default(),
                pending_upload: None,
                load_state: LoadState::Loading,
                submit_state: SubmitState::Idle,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pobiera produkt i zasila formularz.
    ///
    /// Wołane raz po zamontowaniu widoku. Każda przyczyna niepowodzenia
    /// (sieć, status, zepsute body, pusty identyfikator) kończy się tym
    /// samym komunikatem i terminalnym stanem `Failed` — formularz zostaje
    /// przy pustych wartościach początkowych.
    pub async fn load(&self) {
        let product_id = self.product_id.trim();
        let fetch_result = if product_id.is_empty() {
            Err(AppError::Validation(
                "Brak identyfikatora produktu".to_string(),
            ))
        } else {
            self.api.fetch_product(product_id).await
        };

        match fetch_result {
            Ok(data) => {
                let mut state = self.state();
                state.form = EditableForm::from(data);
                state.load_state = LoadState::Loaded;
                tracing::debug!("Załadowano produkt {} do formularza", self.product_id);
            }
            Err(e) => {
                tracing::error!("Błąd ładowania produktu {}: {}", self.product_id, e);
                self.state().load_state = LoadState::Failed;
                self.notifier.notify_error(LOAD_ERROR_MESSAGE);
            }
        }
    }

    /// Scala pojedynczą zmianę pola. Bez aktywności sieciowej; dozwolone w
    /// każdym stanie ładowania, sens ma dopiero po `Loaded`.
    pub fn apply(&self, patch: FormPatch) {
        let mut state = self.state();
        state.form = state.form.with_patch(patch);
    }

    /// Odkłada nowe zdjęcie do wysłania; nie rusza `form.photo`.
    pub fn set_pending_upload(&self, upload: PendingUpload) {
        self.state().pending_upload = Some(upload);
    }

    pub fn clear_pending_upload(&self) {
        self.state().pending_upload = None;
    }

    /// Wysyła aktualizację produktu.
    ///
    /// Drugie wywołanie w trakcie trwającego wysyłania jest no-opem.
    /// Walidacja odbywa się przed przejściem w `Submitting` i przed
    /// jakimkolwiek kontaktem z siecią. Po niepowodzeniu zapisu formularz
    /// i odłożone zdjęcie zostają nietknięte, żeby dało się ponowić.
    pub async fn submit(&self) {
        // KROK 1: migawka stanu i blokada podwójnego wysłania pod jedną blokadą
        let payload = {
            let mut state = self.state();

            if state.submit_state == SubmitState::Submitting {
                tracing::debug!("Pominięto submit — poprzednie wysłanie nadal w toku");
                return;
            }
            if state.load_state != LoadState::Loaded {
                tracing::warn!(
                    "Pominięto submit — formularz nie jest załadowany (stan: {})",
                    state.load_state
                );
                return;
            }

            if let Err(errors) = state.form.validate() {
                tracing::warn!("Walidacja formularza nie powiodła się: {}", errors);
                drop(state);
                self.notifier.notify_error(VALIDATION_ERROR_MESSAGE);
                return;
            }

            state.submit_state = SubmitState::Submitting;
            UpdatePayload::from_form(&state.form, state.pending_upload.clone())
        };

        // KROK 2: właściwe żądanie — już bez trzymania blokady
        let outcome = self
            .api
            .update_product(self.product_id.trim(), payload)
            .await;

        self.state().submit_state = SubmitState::Idle;

        // KROK 3: powiadomienie i ewentualna nawigacja
        match outcome {
            Ok(()) => {
                self.notifier.notify_success(SUBMIT_SUCCESS_MESSAGE);
                self.navigator.navigate_to(PRODUCT_LIST_PATH);
            }
            Err(e) => {
                tracing::error!("Błąd aktualizacji produktu {}: {}", self.product_id, e);
                self.notifier.notify_error(SUBMIT_ERROR_MESSAGE);
            }
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state().load_state
    }

    pub fn submit_state(&self) -> SubmitState {
        self.state().submit_state
    }

    /// Migawka aktualnego stanu formularza.
    pub fn form(&self) -> EditableForm {
        self.state().form.clone()
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhotoSource, ProductData};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn sample_product() -> ProductData {
        ProductData {
            photo: Some("p.jpg".to_string()),
            name: "Shirt".to_string(),
            category: "cat1".to_string(),
            series: String::new(),
            description: "<p>d</p>".to_string(),
            url: String::new(),
        }
    }

    #[derive(Default)]
    struct FakeApi {
        product: Option<ProductData>,
        fail_update: bool,
        gate: Option<Arc<Notify>>,
        fetch_calls: AtomicUsize,
        update_calls: AtomicUsize,
        last_payload: Mutex<Option<UpdatePayload>>,
    }

    impl FakeApi {
        fn with_product(product: ProductData) -> Self {
            FakeApi {
                product: Some(product),
                ..FakeApi::default()
            }
        }

        fn failing_fetch() -> Self {
            FakeApi::default()
        }

        fn failing_update(mut self) -> Self {
            self.fail_update = true;
            self
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl ProductApi for FakeApi {
        async fn fetch_product(&self, _product_id: &str) -> Result<ProductData, AppError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.product
                .clone()
                .ok_or_else(|| AppError::Fetch("Serwer zwrócił status 500".to_string()))
        }

        async fn update_product(
            &self,
            _product_id: &str,
            payload: UpdatePayload,
        ) -> Result<(), AppError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = Some(payload);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_update {
                return Err(AppError::Submit("Serwer zwrócił status 500".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        successes: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }

        fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        paths: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to(&self, path: &str) {
            self.paths.lock().unwrap().push(path.to_string());
        }
    }

    struct Harness {
        api: Arc<FakeApi>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
        controller: Arc<FormController>,
    }

    fn harness(api: FakeApi) -> Harness {
        let api = Arc::new(api);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let controller = Arc::new(FormController::new(
            api.clone(),
            notifier.clone(),
            navigator.clone(),
            "42",
        ));
        Harness {
            api,
            notifier,
            navigator,
            controller,
        }
    }

    #[tokio::test]
    async fn successful_load_seeds_form_with_defaults() {
        let body =
            r#"{"data":{"name":"Shirt","category":"cat1","description":"<p>d</p>","photo":"p.jpg"}}"#;
        let response: crate::models::ProductResponse =
            serde_json::from_str(body).expect("poprawny JSON");
        let h = harness(FakeApi::with_product(response.data));

        h.controller.load().await;

        assert_eq!(h.controller.load_state(), LoadState::Loaded);
        let form = h.controller.form();
        assert_eq!(form.photo, Some("p.jpg".to_string()));
        assert_eq!(form.name, "Shirt");
        assert_eq!(form.category, "cat1");
        assert_eq!(form.series, "");
        assert_eq!(form.description, "<p>d</p>");
        assert_eq!(form.url, "");
    }

    #[tokio::test]
    async fn failed_load_keeps_empty_form_and_notifies() {
        let h = harness(FakeApi::failing_fetch());

        h.controller.load().await;

        assert_eq!(h.controller.load_state(), LoadState::Failed);
        assert_eq!(h.controller.form(), EditableForm::default());
        assert_eq!(
            *h.notifier.errors.lock().unwrap(),
            [LOAD_ERROR_MESSAGE]
        );
    }

    #[tokio::test]
    async fn blank_product_id_fails_load_without_network() {
        let api = Arc::new(FakeApi::with_product(sample_product()));
        let controller = FormController::new(
            api.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(RecordingNavigator::default()),
            "   ",
        );

        controller.load().await;

        assert_eq!(controller.load_state(), LoadState::Failed);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn apply_merges_single_fields_into_the_form() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;

        h.controller
            .apply(FormPatch::Name("Koszula w kratę".to_string()));
        h.controller
            .apply(FormPatch::Description("<p>świeży opis</p>".to_string()));

        let form = h.controller.form();
        assert_eq!(form.name, "Koszula w kratę");
        assert_eq!(form.description, "<p>świeży opis</p>");
        // reszta pól bez zmian
        assert_eq!(form.category, "cat1");
        assert_eq!(form.photo, Some("p.jpg".to_string()));
    }

    #[tokio::test]
    async fn submit_with_blank_required_field_makes_no_network_call() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;
        h.controller.apply(FormPatch::Name("   ".to_string()));

        h.controller.submit().await;

        assert_eq!(h.api.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.controller.submit_state(), SubmitState::Idle);
        assert_eq!(
            *h.notifier.errors.lock().unwrap(),
            [VALIDATION_ERROR_MESSAGE]
        );
        assert!(h.navigator.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_before_load_is_a_no_op() {
        let h = harness(FakeApi::with_product(sample_product()));

        h.controller.submit().await;

        assert_eq!(h.api.update_calls.load(Ordering::SeqCst), 0);
        assert!(h.notifier.successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_notifies_and_navigates() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;

        h.controller.submit().await;

        assert_eq!(h.api.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.controller.submit_state(), SubmitState::Idle);
        assert_eq!(
            *h.notifier.successes.lock().unwrap(),
            [SUBMIT_SUCCESS_MESSAGE]
        );
        assert_eq!(
            *h.navigator.paths.lock().unwrap(),
            [PRODUCT_LIST_PATH]
        );
    }

    #[tokio::test]
    async fn failed_submit_preserves_form_and_does_not_navigate() {
        let h = harness(FakeApi::with_product(sample_product()).failing_update());
        h.controller.load().await;
        h.controller
            .apply(FormPatch::Series("Jesień 2025".to_string()));
        let form_before = h.controller.form();

        h.controller.submit().await;

        assert_eq!(h.controller.submit_state(), SubmitState::Idle);
        assert_eq!(h.controller.form(), form_before);
        assert_eq!(
            *h.notifier.errors.lock().unwrap(),
            [SUBMIT_ERROR_MESSAGE]
        );
        assert!(h.navigator.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_makes_no_extra_request() {
        let gate = Arc::new(Notify::new());
        let h = harness(FakeApi::with_product(sample_product()).gated(gate.clone()));
        h.controller.load().await;

        let first = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.submit().await }
        });

        // poczekaj, aż pierwsze wysłanie utknie na bramce
        while h.api.update_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(h.controller.submit_state(), SubmitState::Submitting);

        h.controller.submit().await; // no-op

        gate.notify_one();
        first.await.expect("zadanie wysyłki");

        assert_eq!(h.api.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifier.successes.lock().unwrap().len(), 1);
        assert_eq!(h.controller.submit_state(), SubmitState::Idle);
    }

    #[tokio::test]
    async fn submitted_payload_prefers_pending_upload_over_reference() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;
        let upload = PendingUpload {
            filename: "new.jpg".to_string(),
            bytes: vec![7, 7, 7],
        };
        h.controller.set_pending_upload(upload.clone());

        h.controller.submit().await;

        let payload = h.api.last_payload.lock().unwrap().clone().expect("payload");
        assert_eq!(payload.photo, Some(PhotoSource::Upload(upload)));
        // referencja do starego zdjęcia w formularzu pozostaje nietknięta
        assert_eq!(h.controller.form().photo, Some("p.jpg".to_string()));
    }

    #[tokio::test]
    async fn submitted_payload_falls_back_to_existing_reference() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;

        h.controller.submit().await;

        let payload = h.api.last_payload.lock().unwrap().clone().expect("payload");
        assert_eq!(
            payload.photo,
            Some(PhotoSource::Existing("p.jpg".to_string()))
        );
    }

    #[tokio::test]
    async fn submitted_payload_omits_photo_when_none_available() {
        let mut product = sample_product();
        product.photo = None;
        let h = harness(FakeApi::with_product(product));
        h.controller.load().await;

        h.controller.submit().await;

        let payload = h.api.last_payload.lock().unwrap().clone().expect("payload");
        assert_eq!(payload.photo, None);
    }

    #[tokio::test]
    async fn clearing_pending_upload_restores_reference_precedence() {
        let h = harness(FakeApi::with_product(sample_product()));
        h.controller.load().await;
        h.controller.set_pending_upload(PendingUpload {
            filename: "new.jpg".to_string(),
            bytes: vec![1],
        });
        h.controller.clear_pending_upload();

        h.controller.submit().await;

        let payload = h.api.last_payload.lock().unwrap().clone().expect("payload");
        assert_eq!(
            payload.photo,
            Some(PhotoSource::Existing("p.jpg".to_string()))
        );
    }
}
