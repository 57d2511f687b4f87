use std::path::PathBuf;

use imgcompare_core::operation::Side;

/// Results sent from helper threads (file dialogs, file rewrites) back to the UI thread.
pub enum UiMessage {
    /// A file was picked for one side.
    OpenSource { side: Side, path: PathBuf },

    /// A file was rotated or flipped on disk and must be reloaded.
    FileTransformed { path: PathBuf, description: String },

    /// Settings were written to `path`.
    SettingsSaved { path: PathBuf },

    /// Settings were read from a file picked by the user.
    SettingsImported {
        settings: imgcompare_core::settings::Settings,
    },

    /// The rendered composite was written to `path`.
    CompositeSaved { path: PathBuf },

    Error { message: String },
}
