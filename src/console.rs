use std::{collections::BTreeSet, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    db::{
        models::{AdminCredentials, GlobalSetting, NewPicker, ProfileEdit, SETTINGS_KEY},
        Collection, DocumentStore,
    },
    directory::{load_directory, load_picker, PickerView},
    error::{ConsoleError, ConsoleResult},
    plans::{
        plan_create, plan_delete, plan_flag_change, plan_update, validate_new_picker, PlanExecutor,
    },
    session::{validate_login, ConsoleSession},
    settings::ConsoleConfig,
    utils::remote::bounded,
};

const ENABLE_LOGS: bool = true;

/// Fleet-wide totals for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub picker_count: u64,
    pub completed_on_time: u64,
    pub completed_late: u64,
    pub completed_orders: u64,
    pub show_skip_button: bool,
}

/// Picker administration over a document store.
///
/// Reads always go to the store; the only local state is the operator
/// session.
#[derive(Clone)]
pub struct PickerConsole<S> {
    executor: PlanExecutor<S>,
    timeout: Duration,
    session: Arc<Mutex<Option<ConsoleSession>>>,
}

impl<S: DocumentStore> PickerConsole<S> {
    pub fn new(store: S, config: &ConsoleConfig) -> Self {
        Self {
            executor: PlanExecutor::new(
                store,
                config.request_timeout(),
                config.propagation_retries,
            ),
            timeout: config.request_timeout(),
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn store(&self) -> &S {
        self.executor.store()
    }

    pub async fn session(&self) -> Option<ConsoleSession> {
        self.session.lock().await.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> ConsoleResult<ConsoleSession> {
        validate_login(email, password)?;

        let doc = bounded(
            format!("get admin/{email}"),
            self.timeout,
            self.store().get(Collection::Admin, email),
        )
        .await?
        .map_err(|err| ConsoleError::fetch(format!("admin {email}"), err))?
        .ok_or_else(|| ConsoleError::Authentication("User does not exist.".into()))?;

        if !AdminCredentials::from_document(email, &doc).password_matches(password) {
            crate::log_warn!("Rejected login for {email}: wrong password");
            return Err(ConsoleError::Authentication("Incorrect password.".into()));
        }

        let session = ConsoleSession::new(email);
        crate::log_info!("Admin {email} logged in (session {})", session.id);
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }

    pub async fn logout(&self) {
        if let Some(session) = self.session.lock().await.take() {
            crate::log_info!("Admin {} logged out", session.admin_email);
        }
    }

    pub async fn list_pickers(&self) -> ConsoleResult<Vec<PickerView>> {
        load_directory(self.store(), self.timeout).await
    }

    pub async fn dashboard(&self) -> ConsoleResult<DashboardSummary> {
        let pickers = self.list_pickers().await?;
        let setting = self.global_setting().await?;

        let mut summary = pickers.iter().fold(DashboardSummary::default(), |mut acc, view| {
            acc.picker_count += 1;
            acc.completed_on_time += view.metrics.completed_on_time;
            acc.completed_late += view.metrics.completed_late;
            acc.completed_orders += view.metrics.completed_orders_count;
            acc
        });
        summary.show_skip_button = setting.show_skip_button;
        Ok(summary)
    }

    /// Load one picker and make it the session's open profile.
    pub async fn view_profile(&self, mobile_number: &str) -> ConsoleResult<PickerView> {
        let view = load_picker(self.store(), mobile_number, self.timeout).await?;
        if let Some(session) = self.session.lock().await.as_mut() {
            session.select_profile(view.clone());
        }
        Ok(view)
    }

    /// Leave the profile screen.
    pub async fn close_profile(&self) {
        if let Some(session) = self.session.lock().await.as_mut() {
            session.clear_profile();
        }
    }

    pub async fn add_picker(&self, picker: NewPicker) -> ConsoleResult<PickerView> {
        validate_new_picker(&picker)?;

        let exists = self.picker_exists(&picker.mobile_number).await?;
        let flag = self.global_setting().await?.show_skip_button;

        let plan = plan_create(&picker, flag, exists)?;
        self.executor.execute(plan).await?;
        crate::log_info!("Added picker {}", picker.mobile_number);

        load_picker(self.store(), &picker.mobile_number, self.timeout).await
    }

    /// Save profile edits, moving the record if the mobile number changed.
    pub async fn save_profile(
        &self,
        old_key: &str,
        edit: ProfileEdit,
    ) -> ConsoleResult<PickerView> {
        if old_key.trim().is_empty() {
            return Err(ConsoleError::MissingKey {
                field: "current mobile number",
            });
        }
        if edit.mobile_number.trim().is_empty() {
            return Err(ConsoleError::MissingKey {
                field: "new mobile number",
            });
        }

        let current = load_picker(self.store(), old_key, self.timeout).await?;
        let mut fields = current.record.fields();
        fields.name = edit.name;
        fields.password = edit.password;

        let new_key = edit.mobile_number;
        let occupied = if new_key != old_key {
            self.picker_exists(&new_key).await?
        } else {
            false
        };

        let plan = plan_update(old_key, &new_key, &fields, |_| occupied)?;
        self.executor.execute(plan).await?;
        if new_key != old_key {
            crate::log_info!("Moved picker {old_key} to {new_key}");
        }

        let saved = load_picker(self.store(), &new_key, self.timeout).await?;
        if let Some(session) = self.session.lock().await.as_mut() {
            session.select_profile(saved.clone());
        }
        Ok(saved)
    }

    pub async fn delete_profile(&self, mobile_number: &str) -> ConsoleResult<()> {
        let plan = plan_delete(mobile_number)?;
        self.executor.execute(plan).await?;
        crate::log_info!("Deleted picker {mobile_number}");

        if let Some(session) = self.session.lock().await.as_mut() {
            session.forget_picker(mobile_number);
        }
        Ok(())
    }

    pub async fn global_setting(&self) -> ConsoleResult<GlobalSetting> {
        let doc = bounded(
            format!("get settings/{SETTINGS_KEY}"),
            self.timeout,
            self.store().get(Collection::Settings, SETTINGS_KEY),
        )
        .await?
        .map_err(|err| ConsoleError::fetch("global settings", err))?;

        let setting = GlobalSetting::from_document(doc.as_ref());
        if let Some(session) = self.session.lock().await.as_mut() {
            session.global_skip_button = Some(setting.show_skip_button);
        }
        Ok(setting)
    }

    /// Set the global flag and mirror it onto every picker.
    pub async fn set_global_setting(&self, value: bool) -> ConsoleResult<GlobalSetting> {
        let listing = self.store().list_all(Collection::Users);
        let keys: BTreeSet<String> = bounded("list users", self.timeout, listing)
            .await?
            .map_err(|err| ConsoleError::fetch("picker keys", err))?
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        let plan = plan_flag_change(value, &keys);
        let report = self.executor.execute(plan).await?;
        crate::log_info!(
            "Skip button set to {value} on {} picker(s) ({} retry round(s))",
            keys.len(),
            report.retry_rounds
        );

        if let Some(session) = self.session.lock().await.as_mut() {
            session.global_skip_button = Some(value);
        }
        Ok(GlobalSetting {
            show_skip_button: value,
        })
    }

    pub async fn toggle_global_setting(&self) -> ConsoleResult<GlobalSetting> {
        let current = self.global_setting().await?;
        self.set_global_setting(!current.show_skip_button).await
    }

    async fn picker_exists(&self, mobile_number: &str) -> ConsoleResult<bool> {
        let doc = bounded(
            format!("get users/{mobile_number}"),
            self.timeout,
            self.store().get(Collection::Users, mobile_number),
        )
        .await?
        .map_err(|err| ConsoleError::fetch(format!("picker {mobile_number}"), err))?;
        Ok(doc.is_some())
    }
}
