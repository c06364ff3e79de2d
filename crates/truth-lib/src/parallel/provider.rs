//! Resolution of annotation targets to phrases. Every path to an
//! undeclared location meets the same hypothetical phrase.

use crate::phrase::{PhraseId, Phrases};
use crate::subject::Subject;

/// Declared phrases under `parent` named `subject`, or the shared
/// hypothetical phrase when there are none.
pub(crate) fn forward(phrases: &mut Phrases, parent: PhraseId, subject: &Subject) -> Vec<PhraseId> {
    let real = phrases.peek(parent, subject, None);
    if !real.is_empty() {
        return real;
    }
    vec![phrases.hypothetical(parent, subject)]
}

/// Maps any phrase to the one [`forward`] would hand out for its location.
pub(crate) fn canonical(phrases: &mut Phrases, id: PhraseId) -> PhraseId {
    if !phrases.is_hypothetical(id) {
        return id;
    }
    let parent = canonical(phrases, phrases.parent(id));
    let subject = phrases.terminal(id).clone();
    match phrases.peek(parent, &subject, None).first() {
        Some(&real) => real,
        None => phrases.hypothetical(parent, &subject),
    }
}
