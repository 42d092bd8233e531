//! Script library tests.
//!
//! Scripts exported from one session behave the same after import into
//! another.

use std::sync::Arc;

use textspace_commands::stdlib::standard_registry;
use textspace_engine::{Engine, EngineConfig};
use textspace_runtime::{ScriptLibrary, Session, World, serialize};
use textspace_script::EventKind;

use crate::Table;

fn bare_session() -> Session {
    let mut world = World::new("lobby");
    world.add_room("lobby", "");
    world.add_room("garden", "");
    world.add_exit("lobby", "north", "garden").unwrap();
    world.add_bot("guide", "garden").unwrap();
    let engine = Engine::new(EngineConfig::deterministic(3));
    Session::from_parts(world, engine, Arc::new(standard_registry().unwrap()))
}

#[test]
fn exported_triggers_fire_after_import() {
    let source = Table::new(&[]);
    let library = ScriptLibrary::from_engine(source.session.engine());
    let bytes = serialize::to_bytes(&library).unwrap();

    let mut session = bare_session();
    let installed = serialize::from_bytes(&bytes)
        .unwrap()
        .install(session.engine_mut());
    assert_eq!(installed, 2);
    assert_eq!(
        session.engine().triggers().matching(EventKind::EnterRoom, "garden"),
        vec!["gift"]
    );

    session.connect("alice");
    session.move_user("alice", "garden").unwrap();
    session.settle(std::time::Instant::now(), 100);
    // This guide has no map, so only the greeting is heard.
    assert_eq!(
        session.world_mut().drain_for("alice"),
        vec!["guide says: Enjoy the garden, alice."]
    );
}

#[test]
fn library_files_survive_a_round_trip() {
    let table = Table::new(&[]);
    let library = ScriptLibrary::from_engine(table.session.engine());
    let path = std::env::temp_dir().join("textspace_integration_library.msgpack");

    serialize::save_to_file(&library, &path).unwrap();
    let restored = serialize::load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored, library);
    let names: Vec<&str> = restored.scripts.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["chime", "gift"]);
}
