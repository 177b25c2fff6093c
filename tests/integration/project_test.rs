//! Project lifecycle tests: validation, conflicts, cascade deletion.

use slidehub::{ErrorKind, KeywordCategory, TagTarget};
use slidehub_database::repositories::ProjectRepository;

use crate::helpers::{TestEnv, convert_and_wait, count_rows, deck};

#[tokio::test]
async fn create_project_rejects_empty_name() {
    let env = TestEnv::new().await;

    let err = env
        .library
        .create_project("   ")
        .await
        .expect_err("blank name must be rejected");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn duplicate_project_folder_is_a_conflict() {
    let env = TestEnv::new().await;

    let session = env.library.create_project("Alpha").await.expect("create");
    let err = env
        .library
        .create_project("Alpha")
        .await
        .expect_err("duplicate must be rejected");
    assert_eq!(err.kind, ErrorKind::Conflict);

    env.library.close_project(session).await;
}

#[tokio::test]
async fn open_project_finds_the_existing_record() {
    let env = TestEnv::new().await;

    let session = env.library.create_project("Reopen").await.expect("create");
    let project_id = session.project().id;
    let root = session.root().to_path_buf();
    env.library.close_project(session).await;

    let session = env.library.open_project(&root).await.expect("open");
    assert_eq!(session.project().id, project_id);
    assert_eq!(session.project().name, "Reopen");
    env.library.close_project(session).await;
}

#[tokio::test]
async fn deleting_a_project_cascades_to_every_descendant() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Cascade").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(2)).await;
    convert_and_wait(&env, &session).await;

    let slides = session.slides_of(file.id).await.expect("slides");
    session
        .assign_keyword(TagTarget::Slide(slides[0].id), "cascade", KeywordCategory::Topic)
        .await
        .expect("assign slide keyword");

    let elements = session.elements_of(slides[0].id).await.expect("elements");
    session
        .assign_keyword(
            TagTarget::Element(elements[0].id),
            "shape-tag",
            KeywordCategory::Name,
        )
        .await
        .expect("assign element keyword");

    let assembly = session.create_assembly("All").await.expect("assembly");
    session
        .append_to_assembly(assembly.id, slides[0].id)
        .await
        .expect("append");

    let pool = session.pool().clone();
    let tables = [
        "files",
        "slides",
        "elements",
        "keywords",
        "slide_keywords",
        "element_keywords",
        "assemblies",
        "assembly_slides",
    ];
    for table in tables {
        assert!(
            count_rows(&pool, table).await > 0,
            "expected rows in {table} before delete"
        );
    }

    // Row-level delete (not the undoable command) so the database file
    // survives for inspection.
    ProjectRepository::new(pool.clone())
        .delete(session.project().id)
        .await
        .expect("delete project rows");

    for table in tables {
        assert_eq!(
            count_rows(&pool, table).await,
            0,
            "expected {table} to cascade empty"
        );
    }

    // The FTS sync triggers fired for the cascaded rows too.
    assert!(
        session.search_slides("Body").await.expect("search").is_empty(),
        "text index must not outlive its slides"
    );

    env.library.close_project(session).await;
}
