//! Search tests: keyword search scoping and slide text search.

use slidehub::{KeywordCategory, TagTarget};
use slidehub_automation::FakeSlide;

use crate::helpers::{TestEnv, convert_and_wait, deck};

#[tokio::test]
async fn assigned_keyword_is_searchable_and_resolves_its_slide() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Search").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(7)).await;
    convert_and_wait(&env, &session).await;

    let slides = session.slides_of(file.id).await.expect("slides");
    let slide7 = &slides[6];
    session
        .assign_keyword(TagTarget::Slide(slide7.id), "Q4", KeywordCategory::Topic)
        .await
        .expect("assign");

    let found = session
        .search_keywords("Q4", None)
        .await
        .expect("search keywords");
    let q4 = found
        .iter()
        .find(|k| k.text == "Q4")
        .expect("Q4 must be found");
    assert_eq!(q4.category, KeywordCategory::Topic);

    // The slide is retrievable through the association.
    let tagged = session
        .slides_for_keyword(q4.id)
        .await
        .expect("slides for keyword");
    assert_eq!(tagged, vec![slide7.id]);

    // Category scoping excludes non-matching categories.
    let titles = session
        .search_keywords("Q4", Some(KeywordCategory::Title))
        .await
        .expect("scoped search");
    assert!(titles.is_empty());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn slide_text_search_is_case_insensitive_substring() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("TextSearch").await.expect("create");

    let file = env
        .import_scripted(
            &session,
            "deck.pptx",
            vec![
                FakeSlide::titled("Roadmap").with_body("Budget overview for the year"),
                FakeSlide::titled("Team").with_notes("hiring plan"),
                FakeSlide::titled("Summary"),
            ],
        )
        .await;
    convert_and_wait(&env, &session).await;

    let slides = session.slides_of(file.id).await.expect("slides");

    let hits = session.search_slides("BUDGET").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, slides[0].id);

    let hits = session.search_slides("hiring").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, slides[1].id);

    assert!(session.search_slides("zebra").await.expect("search").is_empty());

    env.library.close_project(session).await;
}
