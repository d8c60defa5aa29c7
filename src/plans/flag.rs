use std::collections::BTreeSet;

use crate::{
    db::{
        models::{picker::FIELD_SHOW_SKIP_BUTTON, GlobalSetting, SETTINGS_KEY},
        Collection, Document, SetMode,
    },
    error::DocRef,
};

use super::{WriteOp, WritePlan};

/// Plan bringing every picker and the global settings document to `value`.
///
/// Each operation touches a different document, so the plan is concurrent.
pub fn plan_flag_change(value: bool, picker_keys: &BTreeSet<String>) -> WritePlan {
    let mut flag = Document::new();
    flag.insert(FIELD_SHOW_SKIP_BUTTON.into(), value.into());

    let mut ops: Vec<WriteOp> = picker_keys
        .iter()
        .map(|key| WriteOp::Update {
            target: DocRef::new(Collection::Users, key.as_str()),
            fields: flag.clone(),
        })
        .collect();

    ops.push(WriteOp::Set {
        target: DocRef::new(Collection::Settings, SETTINGS_KEY),
        fields: GlobalSetting {
            show_skip_button: value,
        }
        .to_document(),
        mode: SetMode::Merge,
    });

    WritePlan::concurrent(ops)
}
