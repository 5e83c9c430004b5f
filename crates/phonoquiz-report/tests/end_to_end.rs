//! End-to-end: built-in exercise → session → check → PDF export.

use chrono::{NaiveDate, NaiveDateTime};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use phonoquiz_core::catalog::find_builtin;
use phonoquiz_core::controller::PageController;
use phonoquiz_core::model::{Answer, Exercise};
use phonoquiz_core::report::ReportDocument;
use phonoquiz_core::session::ExportReadiness;
use phonoquiz_core::{ExportError, RenderError};
use phonoquiz_report::{HtmlRenderer, PdfRenderer};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 7, 0)
        .unwrap()
}

fn skinflint() -> PageController {
    let exercise = find_builtin("ch1-b").unwrap().unwrap();
    PageController::new(exercise).unwrap()
}

/// The answer key's cells for every question, as a student would type them.
fn correct_rows(exercise: &Exercise) -> Vec<(String, Vec<String>)> {
    exercise
        .questions
        .iter()
        .map(|q| match exercise.key.get(&q.id) {
            Some(Answer::Row(cells)) => (q.id.clone(), cells.clone()),
            other => panic!("unexpected key entry {other:?}"),
        })
        .collect()
}

fn as_f32(obj: &Object) -> f32 {
    match obj {
        Object::Real(v) => *v,
        Object::Integer(v) => *v as f32,
        other => panic!("not a number: {other:?}"),
    }
}

fn operations(bytes: &[u8]) -> Vec<Operation> {
    let pdf = Document::load_mem(bytes).unwrap();
    pdf.get_pages()
        .values()
        .flat_map(|id| {
            let content = pdf.get_page_content(*id).unwrap();
            Content::decode(&content).unwrap().operations
        })
        .collect()
}

fn black_fills(ops: &[Operation]) -> usize {
    let mut black = false;
    let mut count = 0;
    for op in ops {
        match op.operator.as_str() {
            "rg" => black = op.operands.iter().all(|o| as_f32(o) == 0.0),
            "f" if black => count += 1,
            _ => {}
        }
    }
    count
}

fn text_shown(ops: &[Operation]) -> Vec<Vec<u8>> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first()?.as_str().ok().map(<[u8]>::to_vec))
        .collect()
}

#[test]
fn all_correct_skinflint_has_no_highlights() {
    let page = skinflint();
    let mut session = page.start_session();
    session.set_name("Ada Lovelace");
    for (id, cells) in correct_rows(page.exercise()) {
        let typed: Vec<String> = cells.iter().map(|c| format!(" ({}) ", c.to_uppercase())).collect();
        session.set_answer(page.exercise(), &id, Answer::Row(typed)).unwrap();
    }

    let snapshot = page.check(&mut session, now()).unwrap();
    assert_eq!(snapshot.verdicts.len(), 7);
    assert!(snapshot.verdicts.iter().all(|v| v.is_correct()));

    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    assert_eq!(report.filename, "ExerciseB_Report_Ada_Lovelace_20240305_1407.pdf");
    assert!(report.bytes.starts_with(b"%PDF-"));
    assert_eq!(black_fills(&operations(&report.bytes)), 0);
}

#[test]
fn one_wrong_manner_highlights_exactly_one_cell() {
    let page = skinflint();
    let mut session = page.start_session();
    session.set_name("Ada Lovelace");
    for (id, mut cells) in correct_rows(page.exercise()) {
        if id == "3" {
            cells[1] = "stop".into();
        }
        session.set_answer(page.exercise(), &id, Answer::Row(cells)).unwrap();
    }

    let snapshot = page.check(&mut session, now()).unwrap().clone();
    let wrong: Vec<&str> = snapshot
        .verdicts
        .iter()
        .filter(|v| !v.is_correct())
        .map(|v| v.question_id.as_str())
        .collect();
    assert_eq!(wrong, vec!["3"]);

    let document = ReportDocument::build(page.exercise(), "Ada Lovelace", now(), &snapshot).unwrap();
    // Row 3, Manner column (Symbol, Place, Manner, ...).
    assert_eq!(document.highlighted_cells(), vec![(2, 2)]);

    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    let ops = operations(&report.bytes);
    assert_eq!(black_fills(&ops), 1);
    let shown = text_shown(&ops);
    assert!(shown.iter().any(|t| t == b"Name: Ada Lovelace"));
    assert!(shown.iter().any(|t| t == b"Timestamp: 2024-03-05 14:07"));
    assert_eq!(shown.iter().filter(|t| t.as_slice() == b"Incorrect").count(), 1);
}

#[test]
fn zero_question_exercise_exports_header_only() {
    let mut exercise = find_builtin("ch1-b").unwrap().unwrap();
    exercise.questions.clear();
    exercise.key = Default::default();
    let page = PageController::new(exercise).unwrap();
    let mut session = page.start_session();
    session.set_name("Ada");
    page.check(&mut session, now()).unwrap();

    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    let ops = operations(&report.bytes);
    assert_eq!(black_fills(&ops), 0);
    let shown = text_shown(&ops);
    assert!(shown.iter().any(|t| t == b"Symbol"));
    assert!(shown.iter().any(|t| t == b"Result"));
}

#[test]
fn export_without_name_is_blocked() {
    let page = skinflint();
    let mut session = page.start_session();
    page.check(&mut session, now()).unwrap();
    let err = page
        .export(&mut session, &PdfRenderer::new(), now())
        .unwrap_err();
    assert!(matches!(err, ExportError::Blocked(ExportReadiness::NameMissing)));
    assert!(session.snapshot().is_some());
}

#[test]
fn control_character_in_answer_fails_without_bytes() {
    let page = skinflint();
    let mut session = page.start_session();
    session.set_name("Ada");
    let cells = vec!["alveolar".into(), "fricative".into(), "voiceless".into(), "s\u{1b}h".into()];
    session.set_answer(page.exercise(), "1", Answer::Row(cells)).unwrap();
    page.check(&mut session, now()).unwrap();

    let err = page
        .export(&mut session, &PdfRenderer::new(), now())
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Render(RenderError::Unencodable { ch: '\u{1b}', .. })
    ));
    // The same snapshot still exports as HTML.
    let report = page.export(&mut session, &HtmlRenderer, now()).unwrap();
    assert!(report.filename.ends_with(".html"));
}

#[test]
fn ipa_answer_is_replaced_in_pdf_and_kept_in_html() {
    let page = skinflint();
    let cells: Vec<String> = vec!["alveolar".into(), "fricative".into(), "voiceless".into(), "ʃ-like".into()];

    let mut session = page.start_session();
    session.set_name("Ada");
    session.set_answer(page.exercise(), "1", Answer::Row(cells.clone())).unwrap();
    page.check(&mut session, now()).unwrap();
    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    assert!(text_shown(&operations(&report.bytes)).iter().any(|t| t == b"?-like"));

    session.set_answer(page.exercise(), "1", Answer::Row(cells)).unwrap();
    page.check(&mut session, now()).unwrap();
    let report = page.export(&mut session, &HtmlRenderer, now()).unwrap();
    assert!(String::from_utf8(report.bytes).unwrap().contains("ʃ-like"));
}

#[test]
fn hangul_named_session_exports_to_pdf() {
    let page = skinflint();
    let mut session = page.start_session();
    session.set_name("김민수");
    page.check(&mut session, now()).unwrap();

    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    assert_eq!(report.filename, "ExerciseB_Report_김민수_20240305_1407.pdf");
    let shown = text_shown(&operations(&report.bytes));
    assert!(shown.iter().any(|t| t == b"Name: "));
    assert!(shown.iter().any(|t| t == &[0xAE, 0x40, 0xBB, 0xFC, 0xC2, 0x18]));
}

#[test]
fn polish_name_exports_with_base_letters() {
    let page = skinflint();
    let mut session = page.start_session();
    session.set_name("Łukasz Wójcik");
    page.check(&mut session, now()).unwrap();

    let report = page.export(&mut session, &PdfRenderer::new(), now()).unwrap();
    assert!(report.filename.starts_with("ExerciseB_Report_Łukasz_Wójcik_"));
    let shown = text_shown(&operations(&report.bytes));
    assert!(shown.iter().any(|t| t == b"Name: Lukasz W\xf3jcik"));
}

#[test]
fn every_builtin_exports_to_pdf() {
    for exercise in phonoquiz_core::catalog::builtin_exercises().unwrap() {
        let tag = exercise.tag.clone();
        let page = PageController::new(exercise).unwrap();
        let mut session = page.start_session();
        session.set_name("Grace Hopper");
        page.check(&mut session, now()).unwrap();
        let report = page
            .export(&mut session, &PdfRenderer::new(), now())
            .unwrap_or_else(|e| panic!("{tag}: {e}"));
        assert!(report.filename.starts_with(&format!("{tag}_Report_Grace_Hopper_")));
        Document::load_mem(&report.bytes).unwrap();
    }
}
