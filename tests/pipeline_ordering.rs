//! End-to-end pipeline properties: ordering, liveness, failure isolation.

use dolmet::Segmenter;
use dolmet::audio::source::MockAudioSource;
use dolmet::pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
use dolmet::playback::sink::MockPlaybackSink;
use dolmet::recognize::engine::MockRecognizer;
use dolmet::synth::synthesizer::{MockSynthesizer, ScriptedSynthesis};
use dolmet::translate::translator::MockTranslator;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn quiet_pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig {
        quiet: true,
        ..Default::default()
    })
}

fn wait_for_finish(handle: &PipelineHandle, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if handle.is_finished() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// Played audio order equals recognition order for randomized synthesis
/// latencies, and no utterance is played twice.
#[test]
fn playback_order_matches_recognition_order_under_random_latency() {
    const N: usize = 8;

    // Deterministic but scrambled latencies — later utterances often finish
    // synthesis faster than earlier ones.
    let latencies: Vec<u64> = (0..N as u64).map(|k| (k * 37 + 13) % 90 + 5).collect();

    let texts: Vec<String> = (0..N).map(|k| format!("utterance {k}")).collect();
    let script: Vec<Option<&str>> = texts.iter().map(|t| Some(t.as_str())).collect();

    let source = MockAudioSource::new().with_uniform_chunks(N, 0);
    let segmenter = Segmenter::new(Box::new(MockRecognizer::new().with_script(script)))
        .with_quiet(true);
    let synthesizer = MockSynthesizer::new().with_script(
        latencies
            .iter()
            .map(|&ms| ScriptedSynthesis::echo(Duration::from_millis(ms)))
            .collect(),
    );
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(synthesizer),
            Box::new(sink),
        )
        .unwrap();

    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    let expected: Vec<Vec<u8>> = texts
        .iter()
        .map(|t| format!("{t} (translated)").into_bytes())
        .collect();
    assert_eq!(observer.played_audio(), expected);
}

/// No two playbacks are ever audible at the same time.
#[test]
fn playback_intervals_never_overlap() {
    const N: usize = 5;
    let texts: Vec<String> = (0..N).map(|k| format!("line {k}")).collect();
    let script: Vec<Option<&str>> = texts.iter().map(|t| Some(t.as_str())).collect();

    let source = MockAudioSource::new().with_uniform_chunks(N, 0);
    let segmenter = Segmenter::new(Box::new(MockRecognizer::new().with_script(script)))
        .with_quiet(true);
    let sink = MockPlaybackSink::new().with_play_duration(Duration::from_millis(20));
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(sink),
        )
        .unwrap();

    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    let playbacks = observer.playbacks();
    assert_eq!(playbacks.len(), N);
    for pair in playbacks.windows(2) {
        assert!(
            pair[0].finished <= pair[1].started,
            "playback intervals overlap"
        );
    }
}

/// A failed synthesis drops that utterance and playback resumes with the
/// next one, without blocking.
#[test]
fn failed_synthesis_skips_cleanly_to_next_utterance() {
    let source = MockAudioSource::new().with_uniform_chunks(3, 0);
    let segmenter = Segmenter::new(Box::new(MockRecognizer::new().with_script(vec![
        Some("first"),
        Some("second"),
        Some("third"),
    ])))
    .with_quiet(true);

    // Utterance 1 synthesizes, utterance 2 produces no audio, utterance 3 synthesizes
    let synthesizer = MockSynthesizer::new().with_script(vec![
        ScriptedSynthesis::echo(Duration::from_millis(5)),
        ScriptedSynthesis::no_audio(Duration::from_millis(5)),
        ScriptedSynthesis::echo(Duration::from_millis(5)),
    ]);
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(synthesizer),
            Box::new(sink),
        )
        .unwrap();

    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    assert_eq!(
        observer.played_audio(),
        vec![
            b"first (translated)".to_vec(),
            b"third (translated)".to_vec(),
        ]
    );
}

/// Scenario A: silence-only input forwards nothing to translation,
/// synthesis, or playback.
#[test]
fn silence_only_input_forwards_no_utterances() {
    let source = MockAudioSource::new().with_uniform_chunks(6, 0);
    // Every finalization is empty, as is the end-of-stream flush
    let segmenter = Segmenter::new(Box::new(
        MockRecognizer::new()
            .with_script(vec![Some(""); 6])
            .with_final_text(""),
    ))
    .with_quiet(true);

    let translator = MockTranslator::new();
    let translator_observer = translator.clone();
    let synthesizer = Arc::new(MockSynthesizer::new());
    let sink = MockPlaybackSink::new();
    let sink_observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(translator),
            synthesizer.clone(),
            Box::new(sink),
        )
        .unwrap();

    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    assert!(translator_observer.calls().is_empty());
    assert!(synthesizer.calls().is_empty());
    assert!(sink_observer.playbacks().is_empty());
}

/// Scenario B: a long first synthesis and a short second one still play in
/// recognition order.
#[test]
fn reversed_synthesis_latency_preserves_order() {
    let source = MockAudioSource::new().with_uniform_chunks(2, 0);
    let segmenter = Segmenter::new(Box::new(MockRecognizer::new().with_script(vec![
        Some("hello world"),
        Some("goodbye"),
    ])))
    .with_quiet(true);

    let translator = MockTranslator::new()
        .with_mapping("hello world", "hallo welt")
        .with_mapping("goodbye", "auf wiedersehen");

    // First utterance is slow, second is fast — reversed relative speed
    let synthesizer = MockSynthesizer::new().with_script(vec![
        ScriptedSynthesis::echo(Duration::from_millis(300)),
        ScriptedSynthesis::echo(Duration::from_millis(50)),
    ]);
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(translator),
            Arc::new(synthesizer),
            Box::new(sink),
        )
        .unwrap();

    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    assert_eq!(
        observer.played_audio(),
        vec![b"hallo welt".to_vec(), b"auf wiedersehen".to_vec()]
    );
}

/// Scenario C: end-of-stream after partial recognition state yields exactly
/// one final utterance; a stream ending in silence yields none.
#[test]
fn end_of_stream_flush_yields_at_most_one_utterance() {
    // Case 1: pending buffered speech
    let source = MockAudioSource::new().with_uniform_chunks(2, 0);
    let segmenter = Segmenter::new(Box::new(
        MockRecognizer::new()
            .with_script(vec![None, None])
            .with_final_text("buffered tail"),
    ))
    .with_quiet(true);
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(sink),
        )
        .unwrap();
    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();
    assert_eq!(
        observer.played_audio(),
        vec![b"buffered tail (translated)".to_vec()]
    );

    // Case 2: the engine had nothing buffered
    let source = MockAudioSource::new().with_uniform_chunks(2, 0);
    let segmenter = Segmenter::new(Box::new(
        MockRecognizer::new()
            .with_script(vec![None, None])
            .with_final_text(""),
    ))
    .with_quiet(true);
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(sink),
        )
        .unwrap();
    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();
    assert!(observer.playbacks().is_empty());
}

/// Stopping mid-synthesis leaves nothing holding the playback path: a
/// subsequent run starts cleanly and plays.
#[test]
fn stop_mid_synthesis_does_not_poison_a_following_run() {
    // Live source: one utterance, then endless polling
    let source = MockAudioSource::new()
        .with_uniform_chunks(1, 0)
        .as_live_source();
    let segmenter = Segmenter::new(Box::new(
        MockRecognizer::new().with_script(vec![Some("slow one")]),
    ))
    .with_quiet(true);

    let synthesizer = Arc::new(
        MockSynthesizer::new().with_script(vec![ScriptedSynthesis::echo(Duration::from_secs(2))]),
    );
    let synth_observer = synthesizer.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            synthesizer,
            Box::new(MockPlaybackSink::new()),
        )
        .unwrap();

    // Wait until synthesis is actually in flight, then stop
    let deadline = Instant::now() + Duration::from_secs(5);
    while synth_observer.calls().is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(!synth_observer.calls().is_empty(), "synthesis never started");
    handle.stop();

    // A fresh run must work end to end
    let source = MockAudioSource::new().with_uniform_chunks(1, 0);
    let segmenter = Segmenter::new(Box::new(
        MockRecognizer::new().with_script(vec![Some("next run")]),
    ))
    .with_quiet(true);
    let sink = MockPlaybackSink::new();
    let observer = sink.clone();

    let handle = quiet_pipeline()
        .start(
            Box::new(source),
            segmenter,
            Box::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(sink),
        )
        .unwrap();
    assert!(wait_for_finish(&handle, Duration::from_secs(10)));
    handle.stop();

    assert_eq!(observer.played_audio(), vec![b"next run (translated)".to_vec()]);
}
