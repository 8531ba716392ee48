use crate::dataset::catalog::{Condition, Document, Field, FieldSource};
use crate::dataset::flows::BASE_GROUP;

use super::flags::EvaluationContext;

/// Whether the field must be filled under the current answers.
///
/// Optional fields and fields explicitly marked `required: false` never are.
/// A `requiredIf` gate reads the checklist only; derived flags never switch
/// a field on.
pub fn is_field_required(field: &Field, context: &EvaluationContext) -> bool {
    if field.source == Some(FieldSource::Optional) || !field.required {
        return false;
    }
    match field.required_if.as_deref() {
        Some(flag) => context.checklist.get(flag),
        None => true,
    }
}

/// `!flag` holds only when the flag is unset in both namespaces; a plain
/// `flag` holds when it is set in either.
pub fn condition_holds(condition: &Condition, context: &EvaluationContext) -> bool {
    if condition.negated {
        context.flag_cleared(&condition.flag)
    } else {
        context.flag(&condition.flag)
    }
}

pub fn conditions_satisfied(document: &Document, context: &EvaluationContext) -> bool {
    document
        .conditions
        .iter()
        .all(|condition| condition_holds(condition, context))
}

/// Base documents always apply. A document from any other group needs its
/// group flag set; either way its own `conditions` must hold too.
pub fn document_applies(document: &Document, context: &EvaluationContext) -> bool {
    let group_selected = document.group == BASE_GROUP || context.flag(&document.group);
    group_selected && conditions_satisfied(document, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::flags::{Capabilities, FlagSet};

    fn context(checklist: FlagSet, derived: FlagSet) -> EvaluationContext {
        EvaluationContext::new(checklist, derived, Capabilities::default())
    }

    #[test]
    fn required_if_follows_flag() {
        let field = Field::new("er_form", Some(FieldSource::User)).required_if("emergency");
        let off = context(FlagSet::new().with("emergency", false), FlagSet::new());
        let on = context(FlagSet::new().with("emergency", true), FlagSet::new());
        assert!(!is_field_required(&field, &off));
        assert!(is_field_required(&field, &on));
    }

    #[test]
    fn required_if_ignores_derived_flags() {
        let field = Field::new("er_form", Some(FieldSource::User)).required_if("emergency");
        let derived_only = context(FlagSet::new(), FlagSet::new().with("emergency", true));
        assert!(!is_field_required(&field, &derived_only));
    }

    #[test]
    fn grouped_documents_need_their_group_flag() {
        let mut consent = Document::detailed("surgery_consent", "Surgery consent", Vec::new());
        consent.group = "surgery".to_string();
        let base = Document::detailed("admission_form", "Admission form", Vec::new());

        let unset = context(FlagSet::new(), FlagSet::new());
        assert!(document_applies(&base, &unset));
        assert!(!document_applies(&consent, &unset));

        let answered = context(FlagSet::new(), FlagSet::new().with("surgery", true));
        assert!(document_applies(&consent, &answered));

        let gated = consent.clone().with_conditions(&["!proxy"]);
        let proxy = context(
            FlagSet::new().with("surgery", true).with("proxy", true),
            FlagSet::new(),
        );
        assert!(!document_applies(&gated, &proxy));
    }

    #[test]
    fn optional_and_explicitly_unrequired_fields_are_skipped() {
        let everything = context(FlagSet::new(), FlagSet::new());
        assert!(!is_field_required(
            &Field::new("note", Some(FieldSource::Optional)),
            &everything
        ));
        let mut field = Field::new("phone", Some(FieldSource::User));
        field.required = false;
        assert!(!is_field_required(&field, &everything));
    }

    #[test]
    fn negated_condition_needs_both_namespaces_clear() {
        let document = Document::detailed("self_filing", "Self filing", Vec::new())
            .with_conditions(&["!proxy"]);

        let clear = context(FlagSet::new(), FlagSet::new());
        assert!(conditions_satisfied(&document, &clear));

        let derived_only = context(FlagSet::new(), FlagSet::new().with("proxy", true));
        assert!(!conditions_satisfied(&document, &derived_only));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let document = Document::detailed("transfer_letter", "Transfer letter", Vec::new())
            .with_conditions(&["transfer", "!proxy"]);

        let transfer = context(FlagSet::new().with("transfer", true), FlagSet::new());
        assert!(conditions_satisfied(&document, &transfer));

        let both = context(
            FlagSet::new().with("transfer", true),
            FlagSet::new().with("proxy", true),
        );
        assert!(!conditions_satisfied(&document, &both));
    }
}
