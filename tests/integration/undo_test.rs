//! Command/undo engine tests: round trips, linear history, and the
//! documented filesystem asymmetries.

use slidehub::{CommandOutcome, ErrorKind, KeywordCategory, TagTarget};

use crate::helpers::{TestEnv, convert_and_wait, deck};

#[tokio::test]
async fn rename_project_round_trips_folder_and_row() {
    let env = TestEnv::new().await;
    let mut session = env.library.create_project("Old Name").await.expect("create");
    let old_root = session.root().to_path_buf();

    let outcome = session.rename_project("New Name").await.expect("rename");
    assert_eq!(outcome, CommandOutcome::FullyReversible);
    assert_eq!(session.project().name, "New Name");
    assert!(session.root().ends_with("New Name"));
    assert!(session.root().exists());
    assert!(!old_root.exists());

    let label = env.library.undo().await.expect("undo").expect("label");
    assert!(label.contains("rename project"));
    session.refresh().await.expect("refresh");

    assert_eq!(session.project().name, "Old Name");
    assert_eq!(session.root(), old_root.as_path());
    assert!(old_root.exists());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn rename_file_round_trips_stored_copy() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Files").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    let old_abs = session.root().join(&file.stored_path);

    session
        .rename_file(file.id, "renamed.pptx")
        .await
        .expect("rename");

    let renamed = session.file(file.id).await.expect("file");
    assert_eq!(renamed.stored_path, "imports/renamed.pptx");
    assert!(session.root().join(&renamed.stored_path).exists());
    assert!(!old_abs.exists());

    env.library.undo().await.expect("undo");
    let restored = session.file(file.id).await.expect("file");
    assert_eq!(restored.stored_path, file.stored_path);
    assert!(old_abs.exists());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn delete_file_restores_rows_but_not_disk() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Deletions").await.expect("create");

    let keeper = env.import_scripted(&session, "keeper.pptx", deck(1)).await;
    let file = env.import_scripted(&session, "deck.pptx", deck(2)).await;
    convert_and_wait(&env, &session).await;

    let slides = session.slides_of(file.id).await.expect("slides");
    session
        .assign_keyword(TagTarget::Slide(slides[0].id), "keep", KeywordCategory::Topic)
        .await
        .expect("assign");

    // An assembly referencing the doomed file's slides; deleting the
    // file cascades these ordering rows away.
    let keeper_slide = session.slides_of(keeper.id).await.expect("slides")[0].id;
    let assembly = session.create_assembly("Mixed").await.expect("assembly");
    for slide in [keeper_slide, slides[0].id, slides[1].id] {
        session
            .append_to_assembly(assembly.id, slide)
            .await
            .expect("append");
    }

    let stored_abs = session.root().join(&file.stored_path);
    let assets_dir = session.root().join(format!("assets/{}", file.id));
    assert!(stored_abs.exists());
    assert!(assets_dir.exists());

    // The filesystem irreversibility is reported, never inferred.
    let outcome = session.delete_file(file.id).await.expect("delete");
    match &outcome {
        CommandOutcome::PartiallyReversible { reason } => {
            assert!(reason.contains("disk"));
        }
        CommandOutcome::FullyReversible => panic!("file deletion must report irreversibility"),
    }

    assert_eq!(
        session.file(file.id).await.expect_err("gone").kind,
        ErrorKind::NotFound
    );
    assert!(!stored_abs.exists());
    assert!(!assets_dir.exists());
    assert_eq!(
        session
            .assembly_slides(assembly.id)
            .await
            .expect("rows")
            .len(),
        1
    );

    // Undo restores every database row.
    env.library.undo().await.expect("undo");
    let restored = session.file(file.id).await.expect("file restored");
    assert_eq!(restored.stored_path, file.stored_path);

    let slides = session.slides_of(file.id).await.expect("slides");
    assert_eq!(slides.len(), 2);
    let keywords = session.keywords_for_slide(slides[0].id).await.expect("keywords");
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].text, "keep");

    // Assembly membership and positions come back with the slides.
    let rows = session.assembly_slides(assembly.id).await.expect("rows");
    assert_eq!(
        rows.iter().map(|r| r.slide_id).collect::<Vec<_>>(),
        vec![keeper_slide, slides[0].id, slides[1].id]
    );
    assert_eq!(
        rows.iter().map(|r| r.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    // The filesystem portion stays deleted.
    assert!(!stored_abs.exists());
    assert!(!assets_dir.exists());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn delete_project_restores_database_only() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Doomed").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(2)).await;
    convert_and_wait(&env, &session).await;

    let root = session.root().to_path_buf();
    let project_name = session.project().name.clone();

    let outcome = session.delete_project().await.expect("delete");
    assert!(matches!(outcome, CommandOutcome::PartiallyReversible { .. }));
    assert!(!root.exists());

    // Undo rebuilds the database file and rows inside a fresh folder.
    env.library.undo().await.expect("undo");
    assert!(root.exists());

    let session = env.library.open_project(&root).await.expect("reopen");
    assert_eq!(session.project().name, project_name);
    let restored = session.file(file.id).await.expect("file restored");
    assert_eq!(restored.slide_count, 2);
    assert_eq!(session.slides_of(file.id).await.expect("slides").len(), 2);

    // Imported files and rendered assets are not restored.
    assert!(!root.join(&restored.stored_path).exists());
    assert!(!root.join(format!("assets/{}", file.id)).exists());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn applying_a_command_discards_the_redo_branch() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Linear").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;
    let slide = session.slides_of(file.id).await.expect("slides")[0].id;

    session
        .assign_keyword(TagTarget::Slide(slide), "first", KeywordCategory::Topic)
        .await
        .expect("assign");
    env.library.undo().await.expect("undo");
    assert!(env.library.can_redo().await);

    session
        .assign_keyword(TagTarget::Slide(slide), "second", KeywordCategory::Topic)
        .await
        .expect("assign");

    // Linear history: the undone branch is gone.
    assert!(!env.library.can_redo().await);
    assert_eq!(env.library.redo().await.expect("redo"), None);

    let keywords = session.keywords_for_slide(slide).await.expect("keywords");
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].text, "second");

    env.library.close_project(session).await;
}

#[tokio::test]
async fn undo_then_redo_restores_observable_state() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Redo").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;
    let slide = session.slides_of(file.id).await.expect("slides")[0].id;

    session
        .assign_keyword(TagTarget::Slide(slide), "tagged", KeywordCategory::Name)
        .await
        .expect("assign");

    env.library.undo().await.expect("undo");
    assert!(session.keywords_for_slide(slide).await.expect("keywords").is_empty());
    assert!(session.keywords().await.expect("keywords").is_empty());

    let (label, outcome) = env
        .library
        .redo()
        .await
        .expect("redo")
        .expect("redo target");
    assert!(label.contains("assign keyword"));
    assert_eq!(outcome, CommandOutcome::FullyReversible);

    let keywords = session.keywords_for_slide(slide).await.expect("keywords");
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].text, "tagged");

    env.library.close_project(session).await;
}
