//! Browser bridge.
//!
//! wasm-bindgen cannot export generic structs, so the app and the arcade
//! runner live in a `thread_local!` and are reached through free functions.
//! Every fallible export returns `Result<_, JsValue>`; this is the only place
//! errors become strings.

pub mod runner;

pub use runner::ArcadeRunner;

use std::cell::RefCell;
use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use dadcade_engine::{GameConfig, GameSession, GameType, InputEvent, MemoryRecorder};
use dadcade_flow::{Account, App, AppConfig, Effect, StageEvent, StageTicket, StaticCheckout, ViewModel};
use dadcade_games::{DefaultCatalog, HostError, QueueSource, TriviaSource};

struct WebApp {
    app: App,
    runner: ArcadeRunner,
    trivia: QueueSource,
}

thread_local! {
    static APP: RefCell<Option<WebApp>> = RefCell::new(None);
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn with_app<T>(f: impl FnOnce(&mut WebApp) -> Result<T, JsValue>) -> Result<T, JsValue> {
    APP.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let web = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("app not initialized; call app_init() first"))?;
        f(web)
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

/// Reply to every stage-changing call: effects to run, then the new view.
#[derive(Serialize)]
struct Step<'a> {
    effects: &'a [Effect],
    view: ViewModel,
}

fn step_json(app: &App, effects: &[Effect]) -> Result<String, JsValue> {
    to_json(&Step {
        effects,
        view: app.view(),
    })
}

fn millis(now_ms: f64) -> u64 {
    if now_ms.is_finite() {
        now_ms.max(0.0) as u64
    } else {
        0
    }
}

// ---- Lifecycle ----

/// Install logging and build the app. `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn app_init(config_json: &str, seed: Option<f64>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already installed".into());
    }

    let config = if config_json.trim().is_empty() {
        AppConfig::default()
    } else {
        AppConfig::from_json(config_json).map_err(js_err)?
    };
    let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;

    let trivia = QueueSource::new();
    let feed = trivia.clone();
    let catalog = DefaultCatalog::new(config.arcade.clone())
        .with_trivia_source(move || -> Box<dyn TriviaSource> { Box::new(feed.clone()) });
    let app = App::with_factory(config, Box::new(catalog), MemoryRecorder::new(), seed);

    APP.with(|cell| {
        *cell.borrow_mut() = Some(WebApp {
            app,
            runner: ArcadeRunner::new(GameConfig::default()),
            trivia,
        });
    });
    log::info!("dadcade: initialized");
    Ok(())
}

// ---- Onboarding ----

#[wasm_bindgen]
pub fn app_view() -> Result<String, JsValue> {
    with_app(|w| to_json(&w.app.view()))
}

#[wasm_bindgen]
pub fn app_ticket() -> Result<String, JsValue> {
    with_app(|w| to_json(&w.app.ticket()))
}

/// Apply a stage event such as `{"type":"envelopeOpened"}` under `ticket_json`.
#[wasm_bindgen]
pub fn app_dispatch(ticket_json: &str, event_json: &str) -> Result<String, JsValue> {
    let ticket: StageTicket = serde_json::from_str(ticket_json).map_err(js_err)?;
    let event: StageEvent = serde_json::from_str(event_json).map_err(js_err)?;
    with_app(|w| {
        let effects = w.app.dispatch(ticket, event).map_err(js_err)?;
        step_json(&w.app, &effects)
    })
}

#[wasm_bindgen]
pub fn app_answer(value: &str) -> Result<(), JsValue> {
    with_app(|w| w.app.answer(value).map_err(js_err))
}

#[wasm_bindgen]
pub fn app_next() -> Result<String, JsValue> {
    with_app(|w| {
        let effects = w.app.next_question().map_err(js_err)?;
        step_json(&w.app, &effects)
    })
}

#[wasm_bindgen]
pub fn app_back() -> Result<String, JsValue> {
    with_app(|w| {
        w.app.previous_question().map_err(js_err)?;
        step_json(&w.app, &[])
    })
}

/// Deliver the card generator's JSON response.
#[wasm_bindgen]
pub fn app_card_result(json: &str) -> Result<String, JsValue> {
    with_app(|w| {
        let effects = w.app.card_result(json).map_err(js_err)?;
        step_json(&w.app, &effects)
    })
}

#[wasm_bindgen]
pub fn app_card_failed(reason: &str) -> Result<String, JsValue> {
    with_app(|w| {
        let effects = w.app.card_failed(reason).map_err(js_err)?;
        step_json(&w.app, &effects)
    })
}

/// Replace the account counters with the ones loaded by the page.
#[wasm_bindgen]
pub fn app_set_account(json: &str) -> Result<(), JsValue> {
    let account: Account = serde_json::from_str(json).map_err(js_err)?;
    with_app(|w| {
        w.app.set_account(account);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn app_checkout_url(base_url: &str) -> Result<String, JsValue> {
    with_app(|w| {
        w.app
            .checkout_with(&mut StaticCheckout::new(base_url))
            .map_err(js_err)
    })
}

// ---- Arcade ----

/// Queue one prefetched trivia question (`{id, category, question, ...}`).
#[wasm_bindgen]
pub fn trivia_push(json: &str) -> Result<(), JsValue> {
    with_app(|w| w.trivia.push_json(json).map_err(js_err))
}

#[wasm_bindgen]
pub fn trivia_pending() -> Result<u32, JsValue> {
    with_app(|w| Ok(w.trivia.len() as u32))
}

#[wasm_bindgen]
pub fn arcade_start(game_id: &str, now_ms: f64) -> Result<String, JsValue> {
    let game_type = GameType::parse(game_id)
        .ok_or_else(|| js_err(HostError::UnknownGame(game_id.to_string())))?;
    with_app(|w| {
        let handle = w.app.start_game(game_type, millis(now_ms)).map_err(js_err)?;
        if let Some(config) = w.app.host().game_config() {
            w.runner.attach(config);
        }
        to_json(&handle)
    })
}

/// Advance the arcade by one browser frame of `dt` seconds.
/// Returns how many sessions finished during the frame.
#[wasm_bindgen]
pub fn arcade_tick(dt: f32, now_ms: f64) -> Result<u32, JsValue> {
    with_app(|w| {
        let finished = w.runner.tick(w.app.host_mut(), dt, millis(now_ms));
        Ok(finished.len() as u32)
    })
}

/// The player quits. Returns the recorded session, or `null` when the game
/// cannot end early and was cancelled instead.
#[wasm_bindgen]
pub fn arcade_end(now_ms: f64) -> Result<String, JsValue> {
    with_app(|w| {
        let session = w.app.end_game(millis(now_ms)).map_err(js_err)?;
        to_json(&session)
    })
}

/// Close the game view. A running game is cancelled and not recorded.
#[wasm_bindgen]
pub fn arcade_close() -> Result<(), JsValue> {
    with_app(|w| {
        w.app.close_game();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn arcade_state() -> Result<String, JsValue> {
    with_app(|w| to_json(&w.app.host().snapshot()))
}

/// Sessions recorded since the last call, for the page to persist.
#[wasm_bindgen]
pub fn drain_sessions() -> Result<String, JsValue> {
    with_app(|w| to_json(&w.app.drain_sessions()))
}

/// Seed the dashboard totals with the user's stored sessions (a JSON array).
#[wasm_bindgen]
pub fn arcade_load_sessions(json: &str) -> Result<(), JsValue> {
    let sessions: Vec<GameSession> = serde_json::from_str(json).map_err(js_err)?;
    with_app(|w| {
        w.app.load_sessions(&sessions);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn arcade_stats() -> Result<String, JsValue> {
    with_app(|w| to_json(w.app.stats()))
}

// ---- Input ----

fn push(event: InputEvent) -> Result<(), JsValue> {
    with_app(|w| {
        w.runner.push_input(event);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn input_pointer_down(x: f32, y: f32) -> Result<(), JsValue> {
    push(InputEvent::PointerDown { x, y })
}

#[wasm_bindgen]
pub fn input_pointer_up(x: f32, y: f32) -> Result<(), JsValue> {
    push(InputEvent::PointerUp { x, y })
}

#[wasm_bindgen]
pub fn input_pointer_move(x: f32, y: f32) -> Result<(), JsValue> {
    push(InputEvent::PointerMove { x, y })
}

#[wasm_bindgen]
pub fn input_key_down(key_code: u32) -> Result<(), JsValue> {
    push(InputEvent::KeyDown { key_code })
}

#[wasm_bindgen]
pub fn input_key_up(key_code: u32) -> Result<(), JsValue> {
    push(InputEvent::KeyUp { key_code })
}

/// A grid cell, card or answer picked by index.
#[wasm_bindgen]
pub fn input_select(index: u32) -> Result<(), JsValue> {
    push(InputEvent::Select { index })
}

// ---- Frame buffer accessors ----

fn read<T>(f: impl FnOnce(&ArcadeRunner) -> T) -> Result<T, JsValue> {
    with_app(|w| Ok(f(&w.runner)))
}

#[wasm_bindgen]
pub fn get_frame_ptr() -> Result<*const f32, JsValue> {
    read(|r| r.frame_ptr())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> Result<u32, JsValue> {
    read(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_instances_ptr() -> Result<*const f32, JsValue> {
    read(|r| r.instances_ptr())
}

#[wasm_bindgen]
pub fn get_instance_count() -> Result<u32, JsValue> {
    read(|r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_sound_events_ptr() -> Result<*const u8, JsValue> {
    read(|r| r.sound_events_ptr())
}

#[wasm_bindgen]
pub fn get_sound_events_len() -> Result<u32, JsValue> {
    read(|r| r.sound_events_len())
}

#[wasm_bindgen]
pub fn get_game_events_ptr() -> Result<*const f32, JsValue> {
    read(|r| r.game_events_ptr())
}

#[wasm_bindgen]
pub fn get_game_events_len() -> Result<u32, JsValue> {
    read(|r| r.game_events_len())
}

#[wasm_bindgen]
pub fn get_world_width() -> Result<f32, JsValue> {
    read(|r| r.world_width())
}

#[wasm_bindgen]
pub fn get_world_height() -> Result<f32, JsValue> {
    read(|r| r.world_height())
}

#[wasm_bindgen]
pub fn get_max_instances() -> Result<u32, JsValue> {
    read(|r| r.max_instances())
}

#[wasm_bindgen]
pub fn get_max_sounds() -> Result<u32, JsValue> {
    read(|r| r.max_sounds())
}

#[wasm_bindgen]
pub fn get_max_events() -> Result<u32, JsValue> {
    read(|r| r.max_events())
}

#[wasm_bindgen]
pub fn input_custom(kind: u32, a: f32, b: f32, c: f32) -> Result<(), JsValue> {
    push(InputEvent::Custom { kind, a, b, c })
}
