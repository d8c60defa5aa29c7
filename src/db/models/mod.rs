pub mod admin;
pub mod picker;
pub mod settings;

pub use admin::AdminCredentials;
pub use picker::{NewPicker, OrderRecord, PickerFields, PickerRecord, ProfileEdit};
pub use settings::{GlobalSetting, SETTINGS_KEY};
