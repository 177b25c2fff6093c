//! Keyword graph tests: idempotent assignment, merge semantics, merge
//! suggestions.

use std::collections::HashSet;

use slidehub::{KeywordCategory, TagTarget};
use uuid::Uuid;

use crate::helpers::{TestEnv, convert_and_wait, deck};

#[tokio::test]
async fn assigning_a_keyword_twice_is_a_noop() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Idempotent").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;
    let slide = session.slides_of(file.id).await.expect("slides")[0].clone();

    for _ in 0..2 {
        let outcome = session
            .assign_keyword(TagTarget::Slide(slide.id), "strategy", KeywordCategory::Topic)
            .await
            .expect("assign must not error on repeat");
        assert!(outcome.is_fully_reversible());
    }

    let keywords = session.keywords_for_slide(slide.id).await.expect("keywords");
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].text, "strategy");
    assert_eq!(keywords[0].color, KeywordCategory::Topic.default_color());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn merge_reassigns_every_edge_exactly_once() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Merge").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(3)).await;
    convert_and_wait(&env, &session).await;
    let slides = session.slides_of(file.id).await.expect("slides");
    let (s1, s2, s3) = (slides[0].id, slides[1].id, slides[2].id);

    // "planing" tags slides 1 and 2; "planning" tags slides 2 and 3.
    for (slide, text) in [(s1, "planing"), (s2, "planing"), (s2, "planning"), (s3, "planning")] {
        session
            .assign_keyword(TagTarget::Slide(slide), text, KeywordCategory::Topic)
            .await
            .expect("assign");
    }

    let keywords = session.keywords().await.expect("keywords");
    let source = keywords.iter().find(|k| k.text == "planing").expect("source");
    let dest = keywords.iter().find(|k| k.text == "planning").expect("dest");

    session
        .merge_keywords(vec![source.id], dest.id)
        .await
        .expect("merge");

    // Sources no longer exist.
    let remaining = session.keywords().await.expect("keywords");
    assert!(remaining.iter().all(|k| k.text != "planing"));

    // Every previously tagged slide carries the destination exactly once.
    let tagged = session.slides_for_keyword(dest.id).await.expect("slides");
    assert_eq!(tagged.len(), 3);
    assert_eq!(
        tagged.iter().copied().collect::<HashSet<Uuid>>(),
        [s1, s2, s3].into_iter().collect::<HashSet<Uuid>>()
    );

    // Undo restores the pre-merge graph.
    env.library.undo().await.expect("undo");
    let restored = session.keywords().await.expect("keywords");
    let source = restored.iter().find(|k| k.text == "planing").expect("restored");
    let dest = restored.iter().find(|k| k.text == "planning").expect("dest");

    let source_slides: HashSet<Uuid> =
        session.slides_for_keyword(source.id).await.expect("slides").into_iter().collect();
    let dest_slides: HashSet<Uuid> =
        session.slides_for_keyword(dest.id).await.expect("slides").into_iter().collect();
    assert_eq!(source_slides, [s1, s2].into_iter().collect());
    assert_eq!(dest_slides, [s2, s3].into_iter().collect());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn suggest_merges_proposes_but_never_merges() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Suggest").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;
    let slide = session.slides_of(file.id).await.expect("slides")[0].id;

    for text in ["planing", "planning", "Marketing"] {
        session
            .assign_keyword(TagTarget::Slide(slide), text, KeywordCategory::Topic)
            .await
            .expect("assign");
    }

    let suggestions = session.suggest_merges(0.9).await.expect("suggest");
    assert!(!suggestions.is_empty());
    assert!(suggestions.iter().any(|s| {
        (s.a.text == "planing" && s.b.text == "planning")
            || (s.a.text == "planning" && s.b.text == "planing")
    }));
    assert!(
        suggestions
            .iter()
            .all(|s| s.a.text != "Marketing" && s.b.text != "Marketing")
    );

    // Nothing merged automatically.
    assert_eq!(session.keywords().await.expect("keywords").len(), 3);

    env.library.close_project(session).await;
}

#[tokio::test]
async fn rename_and_recolor_are_undoable() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Edit").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;
    let slide = session.slides_of(file.id).await.expect("slides")[0].id;

    session
        .assign_keyword(TagTarget::Slide(slide), "stratgy", KeywordCategory::Topic)
        .await
        .expect("assign");
    let keyword = session.keywords().await.expect("keywords")[0].clone();

    session
        .rename_keyword(keyword.id, "strategy")
        .await
        .expect("rename");
    session
        .recolor_keyword(keyword.id, "#112233")
        .await
        .expect("recolor");

    let edited = session.keywords().await.expect("keywords")[0].clone();
    assert_eq!(edited.text, "strategy");
    assert_eq!(edited.color, "#112233");

    env.library.undo().await.expect("undo recolor");
    env.library.undo().await.expect("undo rename");

    let restored = session.keywords().await.expect("keywords")[0].clone();
    assert_eq!(restored.text, keyword.text);
    assert_eq!(restored.color, keyword.color);

    env.library.close_project(session).await;
}
