//! Integration tests for the TAS engine
//!
//! Tests full playback and recording lifecycles across the loader, engine,
//! storage and headless runner.

#[cfg(test)]
mod tests {
    use crate::config::TasConfig;
    use crate::tas::{
        Buttons, ControllerFrame, DirStorage, FrameRateHost, FrameResults, HeadlessBackend,
        HeadlessConfig, HeadlessRunner, InputFrame, MemoryStorage, Recorder, ScriptLoader,
        ScriptStorage, TasEngine, Vec4, validate_segments, write_script,
    };

    // ============================================================================
    // Test Game Implementation
    // ============================================================================

    /// Tiny game: walk forward while X is held, collect a cell every 10 units
    #[derive(Default)]
    struct TestGame {
        x: f32,
        fuel_cells: f32,
        frame_rate: u32,
        consumed: Vec<ControllerFrame>,
    }

    impl TestGame {
        fn new() -> Self {
            Self {
                frame_rate: 60,
                ..Default::default()
            }
        }

        fn update(&mut self, frame: &InputFrame) -> FrameResults {
            if frame.buttons.contains(Buttons::X) {
                self.x += 1.0;
                if self.x % 10.0 == 0.0 {
                    self.fuel_cells += 1.0;
                }
            }
            if frame.is_active() {
                self.consumed.push(frame.controller());
            }
            FrameResults {
                tas_frame: frame.tas_frame,
                fuel_cell_total: self.fuel_cells,
                input_buttons: frame.buttons,
                player_position: Vec4 {
                    x: self.x,
                    ..Default::default()
                },
                ..Default::default()
            }
        }
    }

    impl FrameRateHost for TestGame {
        fn frame_rate(&self) -> u32 {
            self.frame_rate
        }

        fn set_frame_rate(&mut self, rate: u32) {
            self.frame_rate = rate;
        }
    }

    impl HeadlessBackend for TestGame {
        fn step(&mut self, frame: &InputFrame) -> anyhow::Result<FrameResults> {
            Ok(self.update(frame))
        }
    }

    fn tick<S: ScriptStorage>(
        engine: &mut TasEngine<S>,
        game: &mut TestGame,
        live: ControllerFrame,
    ) -> InputFrame {
        let frame = engine.poll(&live, game);
        let results = game.update(&frame);
        engine.submit_results(&results, game);
        frame
    }

    // ============================================================================
    // Script Loading
    // ============================================================================

    const SCRIPTS: &[(&str, &str)] = &[
        ("main", "# run\nframe-rate=30\nimport=intro\nmarker=hub\n0\n12,X\nimport=hub\n3\n"),
        ("intro", "skip-spool-movies=true\n5\n2,Start\nskip-spool-movies=false\n"),
        ("hub", "4,X,player-angle=-90\n4,X,Square\n\n#end\nframe-rate=60\n1,Circle\n"),
    ];

    fn storage() -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for (name, contents) in SCRIPTS {
            storage.insert_script(name, contents);
        }
        storage
    }

    #[test]
    fn test_loaded_segments_partition_frames() {
        let storage = storage();
        let loaded = ScriptLoader::new(&storage).load("main").unwrap();

        validate_segments(&loaded.segments).unwrap();
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.segments.frame_count(), 5 + 2 + 12 + 4 + 4 + 1 + 3);

        let first = loaded.segments.get(0).unwrap();
        assert_eq!(first.frame_rate, 30);
        assert!(first.skip_spool_movies);

        let last = loaded.segments.last().unwrap();
        assert_eq!(last.frame_rate, 60);
        assert_eq!(last.marker.as_deref(), Some("hub"));
        assert!(!last.skip_spool_movies);
        assert_eq!(last.player_angle, -90.0);
    }

    #[test]
    fn test_loading_is_idempotent() {
        let storage = storage();
        let loader = ScriptLoader::new(&storage);
        assert_eq!(loader.load("main").unwrap(), loader.load("main").unwrap());
    }

    // ============================================================================
    // Playback
    // ============================================================================

    #[test]
    fn test_game_loop_playback() {
        let mut engine = TasEngine::new(storage(), TasConfig::default()).unwrap();
        let mut game = TestGame::new();

        tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::L3));
        assert_eq!(game.frame_rate, 30);
        while engine.is_playing() {
            tick(&mut engine, &mut game, ControllerFrame::default());
        }

        let expected = ScriptLoader::new(&storage()).load("main").unwrap();
        assert_eq!(game.consumed, expected.segments.expand());
        assert_eq!(game.x, 20.0);
        assert_eq!(game.fuel_cells, 2.0);
        assert_eq!(game.frame_rate, 60);
    }

    #[test]
    fn test_cancel_resets_engine() {
        let mut engine = TasEngine::new(storage(), TasConfig::default()).unwrap();
        let mut game = TestGame::new();

        tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::L3));
        for _ in 0..8 {
            tick(&mut engine, &mut game, ControllerFrame::default());
        }
        assert_eq!(engine.current_frame(), 10);
        assert_eq!(game.frame_rate, 30);

        let frame = tick(
            &mut engine,
            &mut game,
            ControllerFrame::from_buttons(Buttons::TRIANGLE),
        );
        assert_eq!(frame.tas_frame, 0);
        assert_eq!(engine.current_frame(), 0);
        assert_eq!(game.frame_rate, 60);
    }

    #[test]
    fn test_headless_run_from_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("tas").join("jak1");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("main.jaktas"), "save-results=true\nimport=walk\n").unwrap();
        std::fs::write(folder.join("walk.jaktas"), "25,X\n5\n").unwrap();

        let config = TasConfig {
            folder: folder.clone(),
            ..Default::default()
        };
        let storage = DirStorage::new(&config.folder, &config.script_extension);
        let engine = TasEngine::new(storage, config).unwrap();
        let mut runner = HeadlessRunner::new(engine, HeadlessConfig::default());
        let mut game = TestGame::new();
        let summary = runner.run_with_backend(&mut game).unwrap();

        assert_eq!(summary.frames_played, 30);
        assert_eq!(game.fuel_cells, 2.0);

        let results: Vec<_> = std::fs::read_dir(&folder)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".automated.results.json"))
            .collect();
        assert_eq!(results.len(), 1);

        let json = std::fs::read_to_string(folder.join(&results[0])).unwrap();
        let log: serde_json::Value = serde_json::from_str(&json).unwrap();
        let collectable: Vec<_> = log["collectable-frames"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["tas-frame"].as_u64().unwrap())
            .collect();
        assert_eq!(collectable, vec![1, 10, 20, 30]);
    }

    // ============================================================================
    // Recording
    // ============================================================================

    #[test]
    fn test_record_write_load_replay() {
        let trace: Vec<ControllerFrame> = (0..40)
            .map(|i| ControllerFrame {
                buttons: if i % 7 < 3 { Buttons::X } else { Buttons::X | Buttons::SQUARE },
                player_angle: if i < 20 { 0.0 } else { 45.25 },
                player_speed: 1.0,
                camera_angle: -3.5,
                camera_zoom: if i > 30 { 0.1 } else { 0.0 },
            })
            .collect();

        let recorded = Recorder::record_all(&trace);
        let script = write_script(&recorded, &["round trip".to_string()]);
        let storage = MemoryStorage::new().with_script("main", &script);

        let loaded = ScriptLoader::new(&storage).load("main").unwrap();
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.segments.expand(), trace);

        let engine = TasEngine::new(storage, TasConfig::default()).unwrap();
        let mut runner = HeadlessRunner::new(
            engine,
            HeadlessConfig {
                capture_trace: true,
                ..Default::default()
            },
        );
        let summary = runner.run().unwrap();
        let replayed: Vec<_> = summary.trace.iter().map(InputFrame::controller).collect();
        assert_eq!(replayed, trace);
    }

    #[test]
    fn test_recording_through_triggers() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::new(dir.path(), ".jaktas");
        let mut engine = TasEngine::new(storage, TasConfig::default()).unwrap();
        let mut game = TestGame::new();

        tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::L2));
        for _ in 0..15 {
            tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::X));
        }
        for _ in 0..5 {
            tick(&mut engine, &mut game, ControllerFrame::default());
        }
        tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::R2));

        let recording = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .find(|name| name.ends_with(".recording.jaktas"))
            .expect("recording written");

        // Replay the recording as the main script
        std::fs::rename(dir.path().join(&recording), dir.path().join("main.jaktas")).unwrap();
        let mut game = TestGame::new();
        tick(&mut engine, &mut game, ControllerFrame::from_buttons(Buttons::L3));
        while engine.is_playing() {
            tick(&mut engine, &mut game, ControllerFrame::default());
        }

        assert_eq!(game.consumed.len(), 20);
        assert_eq!(game.x, 15.0);
        assert_eq!(game.fuel_cells, 1.0);
    }
}
