use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use teamcv_core::{
    backup_file_name, export_backup, import_backup, BackupError, BusyFlag, Clock, DraftAction,
    DraftSession, Effect, FieldErrors, KeyValueStorage, LoadingGuard, MemberForm, MemoryStorage,
    Mutation, Onboarding, OnboardingEvent, Outcome, ResumeInput, Store, StoreConfig, StoreError,
    StoreEvent, StoreState, SubscriptionId, WelcomeCopy, TOUR_STEPS,
};
use teamcv_render::{pdf_file_name, render_resume};

use crate::browser::{JsClock, LocalStorage};

/// Structured error object for JavaScript
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiError {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl JsApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            fields: None,
        }
    }

    fn not_found(what: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} '{}' not found", what, id))
    }
}

impl From<StoreError> for JsApiError {
    fn from(err: StoreError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl From<BackupError> for JsApiError {
    fn from(err: BackupError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl From<FieldErrors> for JsApiError {
    fn from(err: FieldErrors) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            fields: Some(err),
        }
    }
}

type ApiResult<T> = Result<T, JsApiError>;

fn parse<T: DeserializeOwned>(json: &str) -> ApiResult<T> {
    serde_json::from_str(json).map_err(|e| JsApiError::new("INVALID_INPUT", e.to_string()))
}

fn report(err: &JsApiError) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("[teamcv] {}: {}", err.code, err.message).into());
    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!(code = %err.code, message = %err.message, "api call failed");
}

/// Success payload as JSON, or `{"error": {code, message}}`
fn respond<T: Serialize>(result: ApiResult<T>) -> String {
    match result.and_then(|value| {
        serde_json::to_string(&value)
            .map_err(|e| JsApiError::new("SERIALIZATION_ERROR", e.to_string()))
    }) {
        Ok(json) => json,
        Err(err) => {
            report(&err);
            serde_json::json!({ "error": err }).to_string()
        }
    }
}

fn require(outcome: Outcome, what: &str, id: &str) -> ApiResult<Outcome> {
    match outcome {
        Outcome::Missing => Err(JsApiError::not_found(what, id)),
        other => Ok(other),
    }
}

/// What a JS subscriber receives. It carries the fresh state because the
/// callback runs while the engine is still borrowed by the mutating call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeNotice<'a> {
    event: StoreEvent,
    state: &'a StoreState,
}

/// Holds the export busy flag until JS calls `free()` on it
#[wasm_bindgen]
pub struct ExportTicket {
    _guard: LoadingGuard,
}

/// Resume builder engine exposed to JavaScript
#[wasm_bindgen]
pub struct ResumeApp {
    store: Store,
    draft: DraftSession,
    onboarding: Onboarding,
    exports: BusyFlag,
    subscriptions: HashMap<u32, SubscriptionId>,
    next_subscription: u32,
}

impl ResumeApp {
    /// Engine over an injected backend; used natively and in tests
    pub fn with_backend(
        storage: Rc<dyn KeyValueStorage>,
        clock: Rc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        let onboarding = Onboarding::load(&*storage, &config.onboarding_key)
            .with_welcome_delay(config.welcome_delay_ms);
        Self {
            store: Store::open(storage, clock, config),
            draft: DraftSession::new_blank(),
            onboarding,
            exports: BusyFlag::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn try_update_member(&mut self, id: &str, form_json: &str) -> ApiResult<Outcome> {
        let mut input = parse::<MemberForm>(form_json)?.validate()?;
        // The form never edits links
        input.resume_ids = self
            .store
            .member(id)
            .ok_or_else(|| JsApiError::not_found("Team member", id))?
            .resume_ids
            .clone();
        let outcome = self.store.update_member(id, input)?;
        require(outcome, "Team member", id)
    }

    fn try_start_draft(&mut self, resume_id: Option<String>) -> ApiResult<&ResumeInput> {
        let resume = match resume_id.as_deref() {
            Some(id) => Some(
                self.store
                    .resume(id)
                    .ok_or_else(|| JsApiError::not_found("Resume", id))?,
            ),
            None => None,
        };
        self.draft.reset_to(resume);
        Ok(self.draft.draft())
    }

    fn try_onboarding_event(&mut self, event_json: &str) -> ApiResult<Vec<Effect>> {
        let event: OnboardingEvent = parse(event_json)?;
        let effects = self.onboarding.handle(event);
        if effects.contains(&Effect::PersistCompleted) {
            let storage = self.store.storage().clone();
            self.onboarding
                .persist(&*storage, &self.store.config().onboarding_key)?;
        }
        Ok(effects)
    }

    fn try_render(&self, id: &str) -> ApiResult<&teamcv_core::Resume> {
        self.store
            .resume(id)
            .ok_or_else(|| JsApiError::not_found("Resume", id))
    }
}

#[wasm_bindgen]
impl ResumeApp {
    /// Engine persisted to `localStorage`, or to memory when storage is unavailable
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let storage: Rc<dyn KeyValueStorage> = match LocalStorage::open() {
            Some(storage) => Rc::new(storage),
            None => {
                web_sys::console::warn_1(
                    &"[teamcv] localStorage unavailable, changes will not survive a reload".into(),
                );
                Rc::new(MemoryStorage::new())
            }
        };
        Self::with_backend(storage, Rc::new(JsClock), StoreConfig::default())
    }

    // --- Store ---

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        respond(Ok(self.store.state()))
    }

    /// Apply any store mutation given as tagged JSON; returns the outcome
    #[wasm_bindgen]
    pub fn mutate(&mut self, mutation_json: &str) -> String {
        respond(
            parse::<Mutation>(mutation_json)
                .and_then(|m| self.store.mutate(m).map_err(JsApiError::from)),
        )
    }

    /// Call `callback({event, state})` after every applied mutation; returns a
    /// handle for `unsubscribe`. The callback must read `state` from its
    /// argument: calling back into the engine from inside it is rejected.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: js_sys::Function) -> u32 {
        let id = self.store.subscribe(move |event, state| {
            let notice = ChangeNotice { event, state };
            let payload = serde_wasm_bindgen::to_value(&notice).unwrap_or(JsValue::NULL);
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                web_sys::console::error_1(&err);
            }
        });
        let handle = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(handle, id);
        handle
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        match self.subscriptions.remove(&handle) {
            Some(id) => self.store.unsubscribe(id),
            None => false,
        }
    }

    // --- Resumes ---

    #[wasm_bindgen(js_name = listResumes)]
    pub fn list_resumes(&self) -> String {
        respond(Ok(self.store.resumes()))
    }

    /// Resume JSON, or `null`
    #[wasm_bindgen(js_name = getResume)]
    pub fn get_resume(&self, id: &str) -> String {
        respond(Ok(self.store.resume(id)))
    }

    #[wasm_bindgen(js_name = getCurrentResume)]
    pub fn get_current_resume(&self) -> String {
        respond(Ok(self.store.current_resume()))
    }

    #[wasm_bindgen(js_name = recentResumes)]
    pub fn recent_resumes(&self, limit: Option<u32>) -> String {
        let limit = limit
            .map(|l| l as usize)
            .unwrap_or(self.store.config().recent_limit);
        respond(Ok(self.store.recent_resumes(limit)))
    }

    /// Returns the new id as a JSON string
    #[wasm_bindgen(js_name = addResume)]
    pub fn add_resume(&mut self, input_json: &str) -> String {
        respond(
            parse::<ResumeInput>(input_json)
                .and_then(|input| self.store.add_resume(input).map_err(JsApiError::from)),
        )
    }

    #[wasm_bindgen(js_name = updateResume)]
    pub fn update_resume(&mut self, id: &str, input_json: &str) -> String {
        respond(parse::<ResumeInput>(input_json).and_then(|input| {
            let outcome = self.store.update_resume(id, input)?;
            require(outcome, "Resume", id)
        }))
    }

    #[wasm_bindgen(js_name = deleteResume)]
    pub fn delete_resume(&mut self, id: &str) -> String {
        respond(
            self.store
                .delete_resume(id)
                .map_err(JsApiError::from)
                .and_then(|outcome| require(outcome, "Resume", id)),
        )
    }

    #[wasm_bindgen(js_name = setCurrentResume)]
    pub fn set_current_resume(&mut self, id: Option<String>) -> String {
        respond(
            self.store
                .set_current_resume(id.as_deref())
                .map_err(JsApiError::from),
        )
    }

    // --- Team ---

    #[wasm_bindgen(js_name = listMembers)]
    pub fn list_members(&self) -> String {
        respond(Ok(self.store.members()))
    }

    #[wasm_bindgen(js_name = getMember)]
    pub fn get_member(&self, id: &str) -> String {
        respond(Ok(self.store.member(id)))
    }

    /// Validate the add-member form and insert; field errors come back under `error.fields`
    #[wasm_bindgen(js_name = addMember)]
    pub fn add_member(&mut self, form_json: &str) -> String {
        respond(parse::<MemberForm>(form_json).and_then(|form| {
            let input = form.validate()?;
            Ok(self.store.add_member(input)?)
        }))
    }

    #[wasm_bindgen(js_name = updateMember)]
    pub fn update_member(&mut self, id: &str, form_json: &str) -> String {
        respond(self.try_update_member(id, form_json))
    }

    #[wasm_bindgen(js_name = deleteMember)]
    pub fn delete_member(&mut self, id: &str) -> String {
        respond(
            self.store
                .delete_member(id)
                .map_err(JsApiError::from)
                .and_then(|outcome| require(outcome, "Team member", id)),
        )
    }

    #[wasm_bindgen(js_name = linkResume)]
    pub fn link_resume(&mut self, member_id: &str, resume_id: &str) -> String {
        respond(
            self.store
                .link_resume_to_member(member_id, resume_id)
                .map_err(JsApiError::from)
                .and_then(|outcome| require(outcome, "Team member", member_id)),
        )
    }

    #[wasm_bindgen(js_name = unlinkResume)]
    pub fn unlink_resume(&mut self, member_id: &str, resume_id: &str) -> String {
        respond(
            self.store
                .unlink_resume_from_member(member_id, resume_id)
                .map_err(JsApiError::from)
                .and_then(|outcome| require(outcome, "Team member", member_id)),
        )
    }

    #[wasm_bindgen(js_name = linkedResumes)]
    pub fn linked_resumes(&self, member_id: &str) -> String {
        respond(Ok(self.store.linked_resumes(member_id)))
    }

    #[wasm_bindgen(js_name = unlinkedResumes)]
    pub fn unlinked_resumes(&self, member_id: &str) -> String {
        respond(Ok(self.store.unlinked_resumes(member_id)))
    }

    #[wasm_bindgen(js_name = membersForResume)]
    pub fn members_for_resume(&self, resume_id: &str) -> String {
        respond(Ok(self.store.members_for_resume(resume_id)))
    }

    // --- Draft editing ---

    /// Start editing `resumeId`, or a new resume when omitted
    #[wasm_bindgen(js_name = startDraft)]
    pub fn start_draft(&mut self, resume_id: Option<String>) -> String {
        respond(self.try_start_draft(resume_id))
    }

    /// Apply a draft action; returns the new draft
    #[wasm_bindgen(js_name = dispatchDraft)]
    pub fn dispatch_draft(&mut self, action_json: &str) -> String {
        let dispatched = parse::<DraftAction>(action_json).map(|action| {
            self.draft.dispatch(action);
        });
        respond(dispatched.map(|_| self.draft.draft()))
    }

    #[wasm_bindgen(js_name = getDraft)]
    pub fn get_draft(&self) -> String {
        respond(Ok(&self.draft))
    }

    #[wasm_bindgen(js_name = hasUnsavedChanges)]
    pub fn has_unsaved_changes(&self) -> bool {
        self.draft.has_unsaved_changes()
    }

    #[wasm_bindgen(js_name = saveDraft)]
    pub fn save_draft(&mut self) -> String {
        respond(self.draft.save(&mut self.store).map_err(JsApiError::from))
    }

    #[wasm_bindgen(js_name = discardDraft)]
    pub fn discard_draft(&mut self) -> String {
        self.draft.discard();
        respond(Ok(self.draft.draft()))
    }

    // --- Export ---

    /// Document description for the PDF layout engine
    #[wasm_bindgen(js_name = renderResume)]
    pub fn render_resume(&self, id: &str) -> String {
        respond(self.try_render(id).map(render_resume))
    }

    #[wasm_bindgen(js_name = pdfFileName)]
    pub fn pdf_file_name(&self, id: &str) -> String {
        respond(self.try_render(id).map(pdf_file_name))
    }

    /// Mark an export as running until the returned ticket is freed
    #[wasm_bindgen(js_name = beginExport)]
    pub fn begin_export(&self) -> ExportTicket {
        ExportTicket {
            _guard: self.exports.begin(),
        }
    }

    #[wasm_bindgen(js_name = isExporting)]
    pub fn is_exporting(&self) -> bool {
        self.exports.is_busy()
    }

    /// Pretty-printed backup file contents
    #[wasm_bindgen(js_name = exportBackup)]
    pub fn export_backup(&self) -> String {
        match export_backup(&self.store).to_json() {
            Ok(json) => json,
            Err(err) => respond::<()>(Err(err.into())),
        }
    }

    #[wasm_bindgen(js_name = backupFileName)]
    pub fn backup_file_name(&self) -> String {
        backup_file_name(self.store.clock().now().date_naive())
    }

    /// Returns the number of imported resumes
    #[wasm_bindgen(js_name = importBackup)]
    pub fn import_backup(&mut self, json: &str) -> String {
        respond(import_backup(&mut self.store, json).map_err(JsApiError::from))
    }

    // --- Onboarding ---

    #[wasm_bindgen(js_name = onboardingEvent)]
    pub fn onboarding_event(&mut self, event_json: &str) -> String {
        respond(self.try_onboarding_event(event_json))
    }

    #[wasm_bindgen(js_name = onboardingState)]
    pub fn onboarding_state(&self) -> String {
        respond(Ok(&self.onboarding))
    }

    /// Milliseconds to wait before auto-prompting, if a prompt is due
    #[wasm_bindgen(js_name = autoPromptDelay)]
    pub fn auto_prompt_delay(&self) -> Option<u32> {
        self.onboarding
            .auto_prompt_delay()
            .map(|d| d.as_millis().min(u32::MAX as u128) as u32)
    }

    #[wasm_bindgen(js_name = tourSteps)]
    pub fn tour_steps(&self) -> String {
        respond(Ok(TOUR_STEPS))
    }

    #[wasm_bindgen(js_name = welcomeCopy)]
    pub fn welcome_copy(&self, returning: bool) -> String {
        respond(Ok(WelcomeCopy::for_user(returning)))
    }
}

impl Default for ResumeApp {
    fn default() -> Self {
        Self::new()
    }
}
