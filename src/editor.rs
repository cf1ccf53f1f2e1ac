// src/editor.rs
//! Edytor produktu: maszyna stanów trybu (tworzenie/edycja), szkic z listą obrazków
//! oraz koordynacja zapisu do backendu.
//!
//! Rodzic (widok listy) podaje parę `(tryb, rekord)` przez [`ProductEditor::open`],
//! a po udanym zapisie dostaje zdarzenia [`EditorEvent::Close`] i [`EditorEvent::Refresh`]
//! przez kanał zwrócony z [`ProductEditor::new`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::draft::{ProductDraft, ProductField};
use crate::errors::{ApiError, EditorError};
use crate::images::AppendOutcome;
use crate::models::{ProductPayload, ProductRecord};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
pub enum EditorMode {
    #[default]
    #[strum(serialize = "new")]
    #[serde(rename = "new")]
    Create,
    #[strum(serialize = "edit")]
    #[serde(rename = "edit")]
    Edit,
}

/// Sygnały wysyłane do rodzica po udanym zapisie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Okno edytora powinno zostać schowane.
    Close,
    /// Rodzic powinien ponownie pobrać listę produktów.
    Refresh,
}

/// Zdalne operacje zapisu, z których korzysta edytor. Dołączenie tokenu
/// autoryzacyjnego to sprawa implementacji.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn create_product(&self, payload: &ProductPayload) -> Result<String, ApiError>;

    async fn edit_product(&self, id: &str, payload: &ProductPayload) -> Result<String, ApiError>;
}

/// Przejście maszyny stanów: wylicza nowy szkic dla pary `(tryb, rekord)`.
///
/// Tryb edycji bez rekordu to błąd wywołującego, zgłaszany jako [`EditorError::MissingEditTarget`].
pub fn reseed(
    mode: EditorMode,
    existing: Option<&ProductRecord>,
) -> Result<ProductDraft, EditorError> {
    match (mode, existing) {
        (EditorMode::Create, _) => Ok(ProductDraft::blank()),
        (EditorMode::Edit, Some(record)) => Ok(ProductDraft::from_record(record)),
        (EditorMode::Edit, None) => Err(EditorError::MissingEditTarget),
    }
}

/// Wysyła dokładnie jedno żądanie zależnie od trybu. W trybie edycji brak
/// identyfikatora kończy się błędem bez wykonywania żadnego wywołania.
pub async fn submit_draft(
    api: &dyn ProductApi,
    mode: EditorMode,
    payload: &ProductPayload,
    existing_id: Option<&str>,
) -> Result<String, EditorError> {
    let result = match mode {
        EditorMode::Create => api.create_product(payload).await,
        EditorMode::Edit => {
            let id = existing_id
                .filter(|id| !id.is_empty())
                .ok_or(EditorError::MissingEditTarget)?;
            api.edit_product(id, payload).await
        }
    };

    result.map_err(|e| {
        tracing::error!("Zapis produktu (tryb {}) nie powiódł się: {}", mode, e);
        EditorError::from(e)
    })
}

/// Migawka szkicu w chwili zatwierdzenia. Wynik zapisu odnosi się zawsze do tej migawki,
/// nawet jeśli rodzic w międzyczasie przełączy edytor na inny rekord.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    mode: EditorMode,
    target_id: Option<String>,
    payload: ProductPayload,
    generation: u64,
}

impl SubmitRequest {
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn payload(&self) -> &ProductPayload {
        &self.payload
    }

    pub async fn send(self, api: &dyn ProductApi) -> Result<SubmitReceipt, EditorError> {
        let message = submit_draft(
            api,
            self.mode,
            &self.payload,
            self.target_id.as_deref(),
        )
        .await?;

        Ok(SubmitReceipt {
            mode: self.mode,
            generation: self.generation,
            message,
        })
    }
}

/// Potwierdzenie udanego zapisu, które trzeba oddać edytorowi przez [`ProductEditor::finish_submit`].
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    mode: EditorMode,
    generation: u64,
    message: String,
}

impl SubmitReceipt {
    /// Komunikat zwrócony przez backend.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug)]
pub struct ProductEditor {
    mode: EditorMode,
    target: Option<Arc<ProductRecord>>,
    draft: ProductDraft,
    image_url_input: String,
    // Zwiększane przy każdym przeładowaniu szkicu
    generation: u64,
    events: UnboundedSender<EditorEvent>,
}

impl ProductEditor {
    pub fn new() -> (Self, UnboundedReceiver<EditorEvent>) {
        let (events, receiver) = unbounded_channel();
        let editor = Self {
            mode: EditorMode::Create,
            target: None,
            draft: ProductDraft::blank(),
            image_url_input: String::new(),
            generation: 0,
            events,
        };
        (editor, receiver)
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn target(&self) -> Option<&ProductRecord> {
        self.target.as_deref()
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn image_url_input(&self) -> &str {
        &self.image_url_input
    }

    /// Rodzic zmienił `(tryb, rekord)`: szkic jest w całości wyliczany od nowa,
    /// niezapisane zmiany przepadają. Przy błędzie stan edytora pozostaje bez zmian.
    pub fn open(
        &mut self,
        mode: EditorMode,
        existing: Option<Arc<ProductRecord>>,
    ) -> Result<(), EditorError> {
        let draft = reseed(mode, existing.as_deref()).inspect_err(|_| {
            tracing::error!("Próba otwarcia edytora w trybie edycji bez wskazanego produktu");
        })?;

        self.target = match mode {
            EditorMode::Create => None,
            EditorMode::Edit => existing,
        };
        self.mode = mode;
        self.draft = draft;
        self.image_url_input.clear();
        self.generation += 1;

        tracing::debug!(
            "Edytor otwarty w trybie {} (produkt: {:?})",
            mode,
            self.target.as_ref().map(|r| r.id.as_str())
        );
        Ok(())
    }

    /// Zamknięcie okna porzuca szkic.
    pub fn close(&mut self) {
        // Tryb tworzenia nigdy nie zwraca błędu
        self.mode = EditorMode::Create;
        self.target = None;
        self.draft = ProductDraft::blank();
        self.image_url_input.clear();
        self.generation += 1;
    }

    pub fn set_field(&mut self, field: ProductField, raw: &str) -> Result<(), EditorError> {
        self.draft.set_field(field, raw)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.draft.is_enabled = enabled;
    }

    pub fn set_image_url_input(&mut self, value: impl Into<String>) {
        self.image_url_input = value.into();
    }

    pub fn add_image(&mut self) -> Result<AppendOutcome, EditorError> {
        self.draft.add_image(&mut self.image_url_input)
    }

    pub fn remove_image(&mut self, index: usize) -> Result<String, EditorError> {
        self.draft.remove_image(index)
    }

    /// Robi migawkę szkicu do wysłania. W trybie edycji wymaga wskazanego produktu.
    pub fn begin_submit(&self) -> Result<SubmitRequest, EditorError> {
        let target_id = self.target.as_ref().map(|record| record.id.clone());
        if self.mode == EditorMode::Edit && target_id.as_deref().is_none_or(str::is_empty) {
            return Err(EditorError::MissingEditTarget);
        }

        Ok(SubmitRequest {
            mode: self.mode,
            target_id,
            payload: self.draft.to_payload(),
            generation: self.generation,
        })
    }

    /// Przekazanie po udanym zapisie: reset szkicu (tylko przy tworzeniu), potem `Close`
    /// i `Refresh`. Jeśli edytor został w międzyczasie przeładowany, nowy szkic zostaje
    /// otwarty i emitowany jest tylko `Refresh`.
    pub fn finish_submit(&mut self, receipt: SubmitReceipt) {
        if receipt.generation != self.generation {
            tracing::debug!("Wynik zapisu dotyczy starszego szkicu, bieżący szkic zostaje");
            self.emit(EditorEvent::Refresh);
            return;
        }

        if receipt.mode == EditorMode::Create {
            self.draft = ProductDraft::blank();
            self.image_url_input.clear();
        }
        self.emit(EditorEvent::Close);
        self.emit(EditorEvent::Refresh);
    }

    /// Pełny cykl zapisu: migawka, jedno zdalne wywołanie, przekazanie.
    /// Przy błędzie szkic zostaje nietknięty.
    pub async fn submit(&mut self, api: &dyn ProductApi) -> Result<(), EditorError> {
        let receipt = self.begin_submit()?.send(api).await?;
        self.finish_submit(receipt);
        Ok(())
    }

    fn emit(&self, event: EditorEvent) {
        // Odbiorca mógł już zniknąć (np. zamknięta sesja), wtedy zdarzenie po prostu przepada
        if self.events.send(event).is_err() {
            tracing::debug!("Brak odbiorcy zdarzenia {:?}, pomijam", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::tests::sample_record;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(ProductPayload),
        Edit(String, ProductPayload),
    }

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<Call>>,
        reject_with: Option<String>,
    }

    impl RecordingApi {
        fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::default(),
                reject_with: Some(message.to_string()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self) -> Result<String, ApiError> {
            match &self.reject_with {
                Some(message) => Err(ApiError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message: message.clone(),
                }),
                None => Ok("ok".to_string()),
            }
        }
    }

    #[async_trait]
    impl ProductApi for RecordingApi {
        async fn create_product(&self, payload: &ProductPayload) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push(Call::Create(payload.clone()));
            self.answer()
        }

        async fn edit_product(
            &self,
            id: &str,
            payload: &ProductPayload,
        ) -> Result<String, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Edit(id.to_string(), payload.clone()));
            self.answer()
        }
    }

    fn drain(receiver: &mut UnboundedReceiver<EditorEvent>) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn reseed_create_ignores_record() {
        let record = sample_record();
        let draft = reseed(EditorMode::Create, Some(&record)).unwrap();
        assert_eq!(draft, ProductDraft::blank());
    }

    #[test]
    fn reseed_edit_without_record_is_rejected() {
        assert_eq!(
            reseed(EditorMode::Edit, None),
            Err(EditorError::MissingEditTarget)
        );
    }

    #[test]
    fn mode_strings_match_parent_contract() {
        assert_eq!(EditorMode::Create.to_string(), "new");
        assert_eq!("edit".parse::<EditorMode>().unwrap(), EditorMode::Edit);
    }

    #[test]
    fn switching_back_to_create_discards_unsaved_edits() {
        let (mut editor, _rx) = ProductEditor::new();
        editor
            .open(EditorMode::Edit, Some(Arc::new(sample_record())))
            .unwrap();
        editor.set_field(ProductField::Title, "Foo").unwrap();

        editor.open(EditorMode::Create, None).unwrap();

        assert_eq!(editor.draft().title, "");
        assert_eq!(editor.draft(), &ProductDraft::blank());
        assert!(editor.target().is_none());
    }

    #[test]
    fn failed_open_keeps_previous_state() {
        let (mut editor, _rx) = ProductEditor::new();
        editor.set_field(ProductField::Unit, "kg").unwrap();

        let result = editor.open(EditorMode::Edit, None);

        assert_eq!(result, Err(EditorError::MissingEditTarget));
        assert_eq!(editor.mode(), EditorMode::Create);
        assert_eq!(editor.draft().unit, "kg");
    }

    #[test]
    fn rejected_image_keeps_pending_input() {
        let (mut editor, _rx) = ProductEditor::new();
        editor.set_image_url_input("http://x.com/a.png");

        assert!(editor.add_image().is_err());
        assert_eq!(editor.image_url_input(), "http://x.com/a.png");
        assert!(editor.draft().images().is_empty());

        editor.set_image_url_input("https://x.com/a.png");
        editor.add_image().unwrap();
        assert_eq!(editor.image_url_input(), "");
        assert_eq!(editor.draft().image_url(), "https://x.com/a.png");
    }

    #[tokio::test]
    async fn create_success_resets_draft_and_notifies_parent() {
        let api = RecordingApi::default();
        let (mut editor, mut rx) = ProductEditor::new();
        editor.set_field(ProductField::Title, "Lampa").unwrap();
        editor.set_image_url_input("https://x.com/lampa.png");
        editor.add_image().unwrap();

        editor.submit(&api).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let Call::Create(payload) = &calls[0] else {
            panic!("oczekiwano wywołania create, było {:?}", calls[0]);
        };
        assert_eq!(payload.title, "Lampa");
        assert_eq!(payload.image_url, "https://x.com/lampa.png");
        assert_eq!(editor.draft(), &ProductDraft::blank());
        assert_eq!(drain(&mut rx), vec![EditorEvent::Close, EditorEvent::Refresh]);
    }

    #[tokio::test]
    async fn create_failure_keeps_draft_and_reports_reason() {
        let api = RecordingApi::failing("標題為必填");
        let (mut editor, mut rx) = ProductEditor::new();
        editor.set_field(ProductField::Category, "Dom").unwrap();

        let result = editor.submit(&api).await;

        assert_eq!(result, Err(EditorError::Remote("標題為必填".to_string())));
        assert_eq!(editor.draft().category, "Dom");
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn edit_success_targets_record_and_notifies_parent() {
        let api = RecordingApi::default();
        let (mut editor, mut rx) = ProductEditor::new();
        editor
            .open(EditorMode::Edit, Some(Arc::new(sample_record())))
            .unwrap();
        editor.set_field(ProductField::Price, "120").unwrap();

        editor.submit(&api).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let Call::Edit(id, payload) = &calls[0] else {
            panic!("oczekiwano wywołania edit, było {:?}", calls[0]);
        };
        assert_eq!(id, "-Nprod1");
        assert_eq!(payload.price, 120.0);
        assert_eq!(editor.draft().price, 120.0);
        assert_eq!(drain(&mut rx), vec![EditorEvent::Close, EditorEvent::Refresh]);
    }

    #[tokio::test]
    async fn unchanged_edit_round_trips_the_record() {
        let api = RecordingApi::default();
        let record = sample_record();
        let (mut editor, _rx) = ProductEditor::new();
        editor
            .open(EditorMode::Edit, Some(Arc::new(record.clone())))
            .unwrap();

        editor.submit(&api).await.unwrap();

        let expected = ProductPayload {
            title: record.title,
            category: record.category,
            origin_price: record.origin_price,
            price: record.price,
            unit: record.unit,
            description: record.description,
            content: record.content,
            is_enabled: record.is_enabled,
            image_url: record.image_url,
            images_url: record.images_url.unwrap_or_default(),
        };
        assert_eq!(api.calls(), vec![Call::Edit(record.id, expected)]);
    }

    #[tokio::test]
    async fn unchanged_edit_keeps_stored_main_image() {
        let api = RecordingApi::default();
        let mut record = sample_record();
        record.image_url = "https://cdn.example.com/main.png".to_string();
        record.images_url = None;
        let (mut editor, _rx) = ProductEditor::new();
        editor
            .open(EditorMode::Edit, Some(Arc::new(record.clone())))
            .unwrap();

        editor.submit(&api).await.unwrap();

        let Call::Edit(_, sent) = &api.calls()[0] else {
            panic!("oczekiwano wywołania edit");
        };
        assert_eq!(sent.image_url, "https://cdn.example.com/main.png");
        assert!(sent.images_url.is_empty());
    }

    #[tokio::test]
    async fn edit_failure_keeps_draft_and_emits_nothing() {
        let api = RecordingApi::failing("找不到產品");
        let (mut editor, mut rx) = ProductEditor::new();
        editor
            .open(EditorMode::Edit, Some(Arc::new(sample_record())))
            .unwrap();
        editor.set_field(ProductField::Title, "Czajnik XL").unwrap();
        let before = editor.draft().clone();

        let result = editor.submit(&api).await;

        assert_eq!(result, Err(EditorError::Remote("找不到產品".to_string())));
        assert_eq!(api.calls().len(), 1);
        assert_eq!(editor.draft(), &before);
        assert_eq!(editor.mode(), EditorMode::Edit);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn edit_target_with_empty_id_is_rejected_before_sending() {
        let api = RecordingApi::default();
        let mut record = sample_record();
        record.id = String::new();
        let (mut editor, mut rx) = ProductEditor::new();
        editor.open(EditorMode::Edit, Some(Arc::new(record))).unwrap();

        assert_eq!(
            editor.begin_submit().map(|_| ()),
            Err(EditorError::MissingEditTarget)
        );
        assert_eq!(
            editor.submit(&api).await,
            Err(EditorError::MissingEditTarget)
        );
        assert!(api.calls().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn edit_without_identifier_never_calls_backend() {
        let api = RecordingApi::default();
        let payload = ProductDraft::blank().to_payload();

        let missing = submit_draft(&api, EditorMode::Edit, &payload, None).await;
        let empty = submit_draft(&api, EditorMode::Edit, &payload, Some("")).await;

        assert_eq!(missing, Err(EditorError::MissingEditTarget));
        assert_eq!(empty, Err(EditorError::MissingEditTarget));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn result_resolves_against_snapshot_after_reseed() {
        let api = RecordingApi::default();
        let (mut editor, mut rx) = ProductEditor::new();
        editor.set_field(ProductField::Title, "Pierwszy").unwrap();

        let request = editor.begin_submit().unwrap();
        // Rodzic przełącza edytor, zanim odpowiedź wróci
        editor
            .open(EditorMode::Edit, Some(Arc::new(sample_record())))
            .unwrap();
        let receipt = request.send(&api).await.unwrap();
        editor.finish_submit(receipt);

        let Call::Create(sent) = &api.calls()[0] else {
            panic!("oczekiwano wywołania create");
        };
        assert_eq!(sent.title, "Pierwszy");
        assert_eq!(editor.draft().title, "Czajnik");
        assert_eq!(editor.mode(), EditorMode::Edit);
        // Okno otwarte na nowo nie jest zamykane, lista i tak się odświeża
        assert_eq!(drain(&mut rx), vec![EditorEvent::Refresh]);
    }

    #[tokio::test]
    async fn dropped_event_consumer_is_tolerated() {
        let api = RecordingApi::default();
        let (mut editor, rx) = ProductEditor::new();
        drop(rx);

        assert!(editor.submit(&api).await.is_ok());
    }
}
