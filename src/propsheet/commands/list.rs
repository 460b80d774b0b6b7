use crate::commands::{CmdMessage, CmdResult, DocumentSummary};
use crate::error::Result;
use crate::metadata::read_properties;
use crate::render::visible_properties;
use crate::settings::Settings;
use crate::store::DocumentStore;

/// Every document in the store with the number of rows its block would have.
pub fn run(store: &dyn DocumentStore, settings: &Settings) -> Result<CmdResult> {
    let excluded = settings.excluded_names();

    let mut documents = Vec::new();
    for path in store.list_documents()? {
        let text = store.read_text(&path)?;
        let visible = read_properties(&text)
            .map(|properties| visible_properties(&properties, &excluded).len())
            .unwrap_or(0);
        documents.push(DocumentSummary {
            path,
            visible_properties: visible,
        });
    }

    let mut result = CmdResult::default().with_documents(documents);
    if result.documents.is_empty() {
        result.add_message(CmdMessage::info("No documents found."));
    }
    Ok(result)
}
