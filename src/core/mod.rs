pub mod browser;
pub mod busy;
pub mod confirm;
pub mod forms;
pub mod notify;
pub mod session;
pub mod store;

pub use browser::Browser;
pub use busy::{BusyControls, BusyGuard, Control};
pub use confirm::{AssumeNo, AssumeYes, Confirm, PromptConfirm};
pub use forms::{AddDataForm, AddFamilyForm, Forms};
pub use notify::{Notice, Notifier, Severity};
pub use session::{Compensation, SessionManager, SessionOptions};
pub use store::{FileStorage, MemoryStorage, ProfileStore, Storage, PROFILES_KEY};
