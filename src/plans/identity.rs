use crate::{
    db::{
        models::{NewPicker, PickerFields},
        Collection, SetMode,
    },
    error::{ConsoleError, ConsoleResult, DocRef},
};

use super::{WriteOp, WritePlan};

fn require_key(key: &str, field: &'static str) -> ConsoleResult<()> {
    if key.trim().is_empty() {
        return Err(ConsoleError::MissingKey { field });
    }
    Ok(())
}

fn picker_ref(key: &str) -> DocRef {
    DocRef::new(Collection::Users, key)
}

/// Plan a profile save that may change the picker's mobile number.
///
/// `exists_at_new_key` is only consulted when the key changes. A re-key is a
/// write to the new key followed by a delete of the old one, never the other
/// way round, so an interrupted plan leaves the record under the new key.
pub fn plan_update<F>(
    old_key: &str,
    new_key: &str,
    fields: &PickerFields,
    exists_at_new_key: F,
) -> ConsoleResult<WritePlan>
where
    F: FnOnce(&str) -> bool,
{
    require_key(old_key, "current mobile number")?;
    require_key(new_key, "new mobile number")?;

    let write = WriteOp::Set {
        target: picker_ref(new_key),
        fields: fields.to_document(),
        mode: SetMode::Replace,
    };

    if old_key == new_key {
        return Ok(WritePlan::sequential(vec![write]));
    }

    if exists_at_new_key(new_key) {
        return Err(ConsoleError::Collision {
            key: new_key.to_string(),
        });
    }

    Ok(WritePlan::sequential(vec![
        write,
        WriteOp::Delete {
            target: picker_ref(old_key),
        },
    ]))
}

/// Reject a new picker with any required field left empty.
pub fn validate_new_picker(picker: &NewPicker) -> ConsoleResult<()> {
    require_key(&picker.mobile_number, "mobile number")?;
    for (value, label) in [
        (&picker.name, "name"),
        (&picker.password, "password"),
        (&picker.organization_id, "organization id"),
    ] {
        if value.trim().is_empty() {
            return Err(ConsoleError::Validation(format!("{label} is required")));
        }
    }
    Ok(())
}

/// Plan creation of a new picker with an empty order history.
pub fn plan_create(
    picker: &NewPicker,
    show_skip_button: bool,
    already_exists: bool,
) -> ConsoleResult<WritePlan> {
    validate_new_picker(picker)?;

    if already_exists {
        return Err(ConsoleError::Collision {
            key: picker.mobile_number.clone(),
        });
    }

    let fields = PickerFields {
        name: picker.name.clone(),
        password: picker.password.clone(),
        organization_id: picker.organization_id.clone(),
        completed_orders: Vec::new(),
        show_skip_button,
    };

    Ok(WritePlan::sequential(vec![WriteOp::Set {
        target: picker_ref(&picker.mobile_number),
        fields: fields.to_document(),
        mode: SetMode::Replace,
    }]))
}

pub fn plan_delete(key: &str) -> ConsoleResult<WritePlan> {
    require_key(key, "mobile number")?;
    Ok(WritePlan::sequential(vec![WriteOp::Delete {
        target: picker_ref(key),
    }]))
}
