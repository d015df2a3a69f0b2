use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::editor::{EditorError, QuestionSetEditor};
use super::question::{Currency, QuestionId};
use super::question_set::QuestionSet;
use super::repository::{PostingId, PostingStore};
use crate::workflows::store::RepositoryError;
use crate::workflows::validation::ValidationError;

/// Working copy returned after every draft edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub questions: QuestionSet,
    pub incomplete_question_ids: Vec<QuestionId>,
}

impl DraftView {
    fn from_editor(editor: &QuestionSetEditor) -> Self {
        Self {
            questions: editor.question_set().clone(),
            incomplete_question_ids: editor.incomplete().iter().cloned().collect(),
        }
    }
}

/// Service wrapping the editor with draft persistence and publishing.
pub struct PostingEditorService<P> {
    store: Arc<P>,
    default_currency: Currency,
}

impl<P> PostingEditorService<P>
where
    P: PostingStore + 'static,
{
    pub fn new(store: Arc<P>, default_currency: Currency) -> Self {
        Self {
            store,
            default_currency,
        }
    }

    pub fn default_currency(&self) -> Currency {
        self.default_currency
    }

    /// Published question set candidates answer against.
    pub fn published(&self, posting_id: &PostingId) -> Result<QuestionSet, PostingError> {
        self.store
            .load_question_set(posting_id)?
            .ok_or(PostingError::Repository(RepositoryError::NotFound))
    }

    /// Validate and publish `set`; the draft is replaced by the published copy.
    pub fn publish(
        &self,
        posting_id: &PostingId,
        set: QuestionSet,
    ) -> Result<QuestionSet, PostingError> {
        set.validate().map_err(PostingError::Invalid)?;
        self.store.save_draft(posting_id, set.clone())?;
        self.store.save_question_set(posting_id, set.clone())?;
        info!(posting_id = %posting_id, questions = set.len(), "question set published");
        Ok(set)
    }

    /// Publish the current draft.
    pub fn publish_draft(&self, posting_id: &PostingId) -> Result<QuestionSet, PostingError> {
        let draft = self
            .store
            .load_draft(posting_id)?
            .ok_or(PostingError::Repository(RepositoryError::NotFound))?;
        self.publish(posting_id, draft)
    }

    /// Current draft, falling back to the published set and then to an empty set.
    pub fn draft(&self, posting_id: &PostingId) -> Result<DraftView, PostingError> {
        let editor = self.open_editor(posting_id)?;
        Ok(DraftView::from_editor(&editor))
    }

    /// Persist a working copy without validating it.
    pub fn save_draft(
        &self,
        posting_id: &PostingId,
        set: QuestionSet,
    ) -> Result<DraftView, PostingError> {
        let editor = QuestionSetEditor::new(set, self.default_currency);
        self.store
            .save_draft(posting_id, editor.question_set().clone())?;
        debug!(posting_id = %posting_id, "draft saved");
        Ok(DraftView::from_editor(&editor))
    }

    /// Run one editor operation against the draft and save the result.
    pub fn edit<T, F>(&self, posting_id: &PostingId, operation: F) -> Result<(DraftView, T), PostingError>
    where
        F: FnOnce(&mut QuestionSetEditor) -> Result<T, EditorError>,
    {
        let mut editor = self.open_editor(posting_id)?;
        let output = operation(&mut editor)?;
        self.store
            .save_draft(posting_id, editor.question_set().clone())?;
        Ok((DraftView::from_editor(&editor), output))
    }

    fn open_editor(&self, posting_id: &PostingId) -> Result<QuestionSetEditor, PostingError> {
        let set = match self.store.load_draft(posting_id)? {
            Some(draft) => draft,
            None => self
                .store
                .load_question_set(posting_id)?
                .unwrap_or_default(),
        };
        Ok(QuestionSetEditor::new(set, self.default_currency))
    }
}

/// Error raised by the posting editor service.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("question set has {} validation issue(s)", .0.len())]
    Invalid(Vec<ValidationError>),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::workflows::postings::editor::QuestionPatch;
    use crate::workflows::postings::question::{QuestionVariant, RangeType, RangeUnit};

    /// Keeps every question set as a JSON document, like a persisted posting.
    #[derive(Default)]
    struct DocumentStore {
        published: Mutex<HashMap<PostingId, String>>,
        drafts: Mutex<HashMap<PostingId, String>>,
    }

    fn read(
        documents: &Mutex<HashMap<PostingId, String>>,
        id: &PostingId,
    ) -> Result<Option<QuestionSet>, RepositoryError> {
        let guard = documents.lock().expect("store mutex");
        guard
            .get(id)
            .map(|document| serde_json::from_str(document))
            .transpose()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))
    }

    fn write(
        documents: &Mutex<HashMap<PostingId, String>>,
        id: &PostingId,
        set: QuestionSet,
    ) -> Result<(), RepositoryError> {
        let document = serde_json::to_string(&set).expect("serializable set");
        documents
            .lock()
            .expect("store mutex")
            .insert(id.clone(), document);
        Ok(())
    }

    impl PostingStore for DocumentStore {
        fn load_question_set(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
            read(&self.published, id)
        }

        fn save_question_set(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
            write(&self.published, id, set)
        }

        fn load_draft(&self, id: &PostingId) -> Result<Option<QuestionSet>, RepositoryError> {
            read(&self.drafts, id)
        }

        fn save_draft(&self, id: &PostingId, set: QuestionSet) -> Result<(), RepositoryError> {
            write(&self.drafts, id, set)
        }
    }

    fn service(currency: Currency) -> PostingEditorService<DocumentStore> {
        PostingEditorService::new(Arc::new(DocumentStore::default()), currency)
    }

    fn switch(
        service: &PostingEditorService<DocumentStore>,
        posting: &PostingId,
        question_id: &QuestionId,
        patch: QuestionPatch,
    ) -> Option<RangeUnit> {
        let (_, unit) = service
            .edit(posting, |editor| {
                editor
                    .update(question_id, patch)
                    .map(|question| question.kind.range().map(|spec| spec.unit))
            })
            .expect("edit applied");
        unit
    }

    fn add_custom(service: &PostingEditorService<DocumentStore>, posting: &PostingId) -> QuestionId {
        let (draft, ()) = service
            .edit(posting, |editor| {
                editor.add_custom();
                Ok(())
            })
            .expect("question added");
        draft.questions.questions()[0].id.clone()
    }

    #[test]
    fn currency_range_is_remembered_across_draft_edits() {
        let service = service(Currency::Usd);
        let posting = PostingId::from("p-1");
        let question_id = add_custom(&service, &posting);

        let unit = switch(
            &service,
            &posting,
            &question_id,
            QuestionPatch {
                variant: Some(QuestionVariant::Range),
                range_type: Some(RangeType::Currency),
                ..QuestionPatch::default()
            },
        );
        assert_eq!(unit, Some(RangeUnit::Currency(Currency::Usd)));

        let unit = switch(
            &service,
            &posting,
            &question_id,
            QuestionPatch {
                variant: Some(QuestionVariant::ShortAnswer),
                ..QuestionPatch::default()
            },
        );
        assert_eq!(unit, None);

        let unit = switch(
            &service,
            &posting,
            &question_id,
            QuestionPatch {
                variant: Some(QuestionVariant::Range),
                ..QuestionPatch::default()
            },
        );
        assert_eq!(unit, Some(RangeUnit::Currency(Currency::Usd)));
    }

    #[test]
    fn number_range_without_currency_history_stays_number() {
        let service = service(Currency::Php);
        let posting = PostingId::from("p-2");
        let question_id = add_custom(&service, &posting);

        let unit = switch(
            &service,
            &posting,
            &question_id,
            QuestionPatch {
                variant: Some(QuestionVariant::Range),
                ..QuestionPatch::default()
            },
        );
        assert_eq!(unit, Some(RangeUnit::Number));
    }

    #[test]
    fn publish_rejects_invalid_draft_and_keeps_it() {
        let service = service(Currency::Php);
        let posting = PostingId::from("p-3");
        add_custom(&service, &posting);

        let err = service.publish_draft(&posting).expect_err("blank question");
        assert!(matches!(err, PostingError::Invalid(ref issues) if !issues.is_empty()));
        assert_eq!(service.draft(&posting).expect("draft").questions.len(), 1);
        assert!(matches!(
            service.published(&posting),
            Err(PostingError::Repository(RepositoryError::NotFound))
        ));
    }
}
