use gitsync::sync::SyncError;
use gitsync::ui::output;

fn main() {
    if let Err(err) = gitsync::cli::run() {
        // classified failures were already shown by the notifier
        let reported = err
            .downcast_ref::<SyncError>()
            .is_some_and(SyncError::is_classified);
        if !reported {
            output::error(format!("{err:#}"));
        }
        std::process::exit(1);
    }
}
