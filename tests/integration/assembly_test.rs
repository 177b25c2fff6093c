//! Assembly ordering and export tests.

use std::time::Duration;

use slidehub::{ExportEvent, TaskEventPayload};

use crate::helpers::{TestEnv, convert_and_wait, deck};

#[tokio::test]
async fn move_reorders_and_persists_immediately() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Order").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(3)).await;
    convert_and_wait(&env, &session).await;
    let slides = session.slides_of(file.id).await.expect("slides");
    let (a, b, c) = (slides[0].id, slides[1].id, slides[2].id);

    let assembly = session.create_assembly("Pitch").await.expect("assembly");
    for slide in [a, b, c] {
        session
            .append_to_assembly(assembly.id, slide)
            .await
            .expect("append");
    }

    session
        .move_assembly_slide(assembly.id, 2, 0)
        .await
        .expect("move");

    // [A, B, C] with move(2, 0) becomes [C, A, B], persisted with no
    // separate save step.
    let rows = session.assembly_slides(assembly.id).await.expect("rows");
    assert_eq!(
        rows.iter().map(|r| r.slide_id).collect::<Vec<_>>(),
        vec![c, a, b]
    );
    assert_eq!(
        rows.iter().map(|r| r.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    env.library.undo().await.expect("undo");
    let rows = session.assembly_slides(assembly.id).await.expect("rows");
    assert_eq!(
        rows.iter().map(|r| r.slide_id).collect::<Vec<_>>(),
        vec![a, b, c]
    );

    env.library.close_project(session).await;
}

#[tokio::test]
async fn remove_compacts_positions() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Compact").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(3)).await;
    convert_and_wait(&env, &session).await;
    let slides = session.slides_of(file.id).await.expect("slides");

    let assembly = session.create_assembly("Trimmed").await.expect("assembly");
    for slide in &slides {
        session
            .append_to_assembly(assembly.id, slide.id)
            .await
            .expect("append");
    }

    session
        .remove_from_assembly(assembly.id, slides[1].id)
        .await
        .expect("remove");

    let rows = session.assembly_slides(assembly.id).await.expect("rows");
    assert_eq!(
        rows.iter().map(|r| r.slide_id).collect::<Vec<_>>(),
        vec![slides[0].id, slides[2].id]
    );
    assert_eq!(
        rows.iter().map(|r| r.position).collect::<Vec<_>>(),
        vec![0, 1]
    );

    session.clear_assembly(assembly.id).await.expect("clear");
    assert!(session.assembly_slides(assembly.id).await.expect("rows").is_empty());

    env.library.close_project(session).await;
}

#[tokio::test]
async fn append_after_cascaded_gap_keeps_positions_unique() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Gaps").await.expect("create");

    // One slide per file so deleting a file removes exactly one
    // ordering row, without the compaction that `remove` runs.
    let file_a = env.import_scripted(&session, "a.pptx", deck(1)).await;
    let file_b = env.import_scripted(&session, "b.pptx", deck(1)).await;
    let file_c = env.import_scripted(&session, "c.pptx", deck(1)).await;
    let file_d = env.import_scripted(&session, "d.pptx", deck(1)).await;
    convert_and_wait(&env, &session).await;

    let a = session.slides_of(file_a.id).await.expect("slides")[0].id;
    let b = session.slides_of(file_b.id).await.expect("slides")[0].id;
    let c = session.slides_of(file_c.id).await.expect("slides")[0].id;
    let d = session.slides_of(file_d.id).await.expect("slides")[0].id;

    let assembly = session.create_assembly("Gappy").await.expect("assembly");
    for slide in [a, b, c] {
        session
            .append_to_assembly(assembly.id, slide)
            .await
            .expect("append");
    }

    // Cascade removes b's ordering row, leaving positions [0, 2].
    session.delete_file(file_b.id).await.expect("delete");

    session
        .append_to_assembly(assembly.id, d)
        .await
        .expect("append into gap");

    let rows = session.assembly_slides(assembly.id).await.expect("rows");
    assert_eq!(
        rows.iter().map(|r| r.slide_id).collect::<Vec<_>>(),
        vec![a, c, d]
    );
    let positions: Vec<i64> = rows.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 2, 3], "positions must stay unique");

    env.library.close_project(session).await;
}

#[tokio::test]
async fn export_places_slides_in_order_and_writes_the_document() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Export").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(3)).await;
    convert_and_wait(&env, &session).await;
    let slides = session.slides_of(file.id).await.expect("slides");

    let assembly = session.create_assembly("Subset").await.expect("assembly");
    session
        .append_to_assembly(assembly.id, slides[2].id)
        .await
        .expect("append");
    session
        .append_to_assembly(assembly.id, slides[0].id)
        .await
        .expect("append");

    let out_path = env.out_dir().join("subset.pptx");
    let mut rx = env.library.subscribe();
    let handle = session
        .export(assembly.id, out_path.clone())
        .await
        .expect("start export");

    let mut placed = Vec::new();
    let written = loop {
        let event = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("export timed out")
            .expect("event channel closed");
        if event.task_id != handle.task_id() {
            continue;
        }
        match event.payload {
            TaskEventPayload::Export(ExportEvent::SlidePlaced {
                slide_id,
                position,
                total,
            }) => {
                assert_eq!(total, 2);
                placed.push((slide_id, position));
            }
            TaskEventPayload::Export(ExportEvent::Completed { output_path }) => {
                break output_path;
            }
            TaskEventPayload::Export(other) => panic!("unexpected export event: {other:?}"),
            TaskEventPayload::Conversion(_) => continue,
        }
    };

    // One progress event per slide placed, in assembly order.
    assert_eq!(
        placed,
        vec![(slides[2].id, 1), (slides[0].id, 2)]
    );
    assert!(written.exists());

    // The automation host received the refs resolved to origin file and
    // in-file index, in that exact order.
    let assembled = env.fake.assembled();
    let refs = assembled.last().expect("assemble called");
    assert_eq!(
        refs.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![3, 1]
    );

    env.library.close_project(session).await;
}

#[tokio::test]
async fn cancelled_export_reports_cancelled() {
    let env = TestEnv::new().await;
    let session = env.library.create_project("Cancel").await.expect("create");

    let file = env.import_scripted(&session, "deck.pptx", deck(3)).await;
    convert_and_wait(&env, &session).await;
    let slides = session.slides_of(file.id).await.expect("slides");

    let assembly = session.create_assembly("Never").await.expect("assembly");
    for slide in &slides {
        session
            .append_to_assembly(assembly.id, slide.id)
            .await
            .expect("append");
    }

    let mut rx = env.library.subscribe();
    let handle = session
        .export(assembly.id, env.out_dir().join("never.pptx"))
        .await
        .expect("start export");
    // The signal lands before the spawned task first polls its
    // cancellation check.
    handle.cancel();

    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("export timed out")
            .expect("event channel closed");
        if event.task_id != handle.task_id() {
            continue;
        }
        if let TaskEventPayload::Export(ExportEvent::Cancelled) = event.payload {
            break;
        }
    }

    assert!(env.fake.assembled().is_empty(), "no document was assembled");

    env.library.close_project(session).await;
}
