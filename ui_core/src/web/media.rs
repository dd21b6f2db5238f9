// Camera over getUserMedia, with frames grabbed through an offscreen 2D canvas.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, DomException, Event, HtmlCanvasElement, HtmlVideoElement,
    MediaDevices, MediaStream, MediaStreamConstraints, MediaStreamTrack,
};

use crate::camera::{Camera, RawFrame};
use crate::config::CameraSettings;
use crate::error::CameraError;

// HTMLMediaElement.readyState
const HAVE_METADATA: u16 = 1;
const HAVE_CURRENT_DATA: u16 = 2;

type Settle = Rc<RefCell<Option<oneshot::Sender<Result<(), CameraError>>>>>;

pub struct WebCamera {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    /// Ticket of the newest `open`. Only that request may bind the video.
    latest: Cell<u64>,
}

fn settle(slot: &Settle, outcome: Result<(), CameraError>) {
    if let Some(tx) = slot.borrow_mut().take() {
        let _ = tx.send(outcome);
    }
}

impl WebCamera {
    pub fn new(video: HtmlVideoElement, canvas: HtmlCanvasElement) -> Self {
        WebCamera {
            video,
            canvas,
            latest: Cell::new(0),
        }
    }

    fn still_current(&self, ticket: u64) -> Result<(), CameraError> {
        if self.latest.get() == ticket {
            Ok(())
        } else {
            Err(CameraError::Other(
                "Camera request was replaced by a newer one.".to_string(),
            ))
        }
    }

    fn media_devices(&self) -> Option<MediaDevices> {
        let navigator = web_sys::window()?.navigator();
        let devices = Reflect::get(&navigator, &JsValue::from_str("mediaDevices")).ok()?;
        if devices.is_undefined() || devices.is_null() {
            return None;
        }
        let has_gum = Reflect::get(&devices, &JsValue::from_str("getUserMedia"))
            .map(|f| f.is_function())
            .unwrap_or(false);
        has_gum.then(|| devices.unchecked_into())
    }

    async fn attach(&self, stream: &MediaStream, ticket: u64, timeout_ms: u32) -> Result<(), CameraError> {
        self.still_current(ticket)?;
        self.video.set_src_object(Some(stream));

        if self.video.ready_state() < HAVE_METADATA {
            self.wait_for_metadata(timeout_ms).await?;
        }
        self.still_current(ticket)?;

        let playing = self.video.play().map_err(device_error)?;
        JsFuture::from(playing).await.map_err(device_error)?;
        self.still_current(ticket)
    }

    /// Wait for `loadedmetadata`, failing on `error` or after `timeout_ms`.
    /// Listeners are removed on every path.
    async fn wait_for_metadata(&self, timeout_ms: u32) -> Result<(), CameraError> {
        let (tx, rx) = oneshot::channel();
        let slot: Settle = Rc::new(RefCell::new(Some(tx)));

        let loaded = {
            let slot = Rc::clone(&slot);
            Closure::<dyn FnMut(Event)>::new(move |_| settle(&slot, Ok(())))
        };
        let failed = {
            let slot = Rc::clone(&slot);
            Closure::<dyn FnMut(Event)>::new(move |_| {
                settle(
                    &slot,
                    Err(CameraError::Other(
                        "The camera stream could not be played.".to_string(),
                    )),
                )
            })
        };
        let listeners = [("loadedmetadata", &loaded), ("error", &failed)];

        let outcome = async {
            for (event, callback) in listeners {
                self.video
                    .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                    .map_err(device_error)?;
            }
            match future::select(rx, TimeoutFuture::new(timeout_ms)).await {
                Either::Left((Ok(outcome), _)) => outcome,
                Either::Left((Err(_), _)) => Err(CameraError::Other(String::new())),
                Either::Right(_) => Err(CameraError::Other(format!(
                    "Camera did not deliver video within {} ms.",
                    timeout_ms
                ))),
            }
        }
        .await;

        for (event, callback) in listeners {
            let _ = self
                .video
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
        outcome
    }
}

fn video_constraints(settings: &CameraSettings) -> Result<JsValue, CameraError> {
    let ideal = |value: u32| -> Result<Object, CameraError> {
        let range = Object::new();
        Reflect::set(&range, &"ideal".into(), &JsValue::from(value)).map_err(device_error)?;
        Ok(range)
    };

    let video = Object::new();
    Reflect::set(&video, &"width".into(), &ideal(settings.ideal_width)?).map_err(device_error)?;
    Reflect::set(&video, &"height".into(), &ideal(settings.ideal_height)?)
        .map_err(device_error)?;
    Reflect::set(
        &video,
        &"facingMode".into(),
        &JsValue::from_str(&settings.facing_mode),
    )
    .map_err(device_error)?;
    Ok(video.into())
}

fn device_error(err: JsValue) -> CameraError {
    match err.dyn_ref::<DomException>() {
        Some(dom) => CameraError::from_dom_name(&dom.name(), &dom.message()),
        None => CameraError::Other(err.as_string().unwrap_or_default()),
    }
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

impl Camera for WebCamera {
    type Stream = MediaStream;

    fn is_supported(&self) -> bool {
        self.media_devices().is_some()
    }

    async fn open(&self, settings: &CameraSettings) -> Result<MediaStream, CameraError> {
        let devices = self.media_devices().ok_or(CameraError::Unsupported)?;
        let ticket = self.latest.get() + 1;
        self.latest.set(ticket);

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video_constraints(settings)?);
        constraints.set_audio(&JsValue::FALSE);

        let pending = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(device_error)?;
        let stream: MediaStream = JsFuture::from(pending)
            .await
            .map_err(device_error)?
            .dyn_into()
            .map_err(device_error)?;

        if let Err(err) = self.attach(&stream, ticket, settings.metadata_timeout_ms).await {
            self.close(stream);
            return Err(err);
        }
        Ok(stream)
    }

    fn grab_frame(&self, _stream: &MediaStream) -> Result<Option<RawFrame>, CameraError> {
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if self.video.ready_state() < HAVE_CURRENT_DATA || width == 0 || height == 0 {
            return Ok(None);
        }

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let context: CanvasRenderingContext2d = self
            .canvas
            .get_context("2d")
            .map_err(device_error)?
            .ok_or_else(|| CameraError::Other("2D canvas context unavailable".to_string()))?
            .dyn_into()
            .map_err(|_| CameraError::Other("2D canvas context unavailable".to_string()))?;

        context
            .draw_image_with_html_video_element(&self.video, 0.0, 0.0)
            .map_err(device_error)?;
        let pixels = context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(device_error)?
            .data();

        RawFrame::new(width, height, pixels.0)
            .map(Some)
            .map_err(|err| CameraError::Other(err.to_string()))
    }

    fn close(&self, stream: MediaStream) {
        stop_tracks(&stream);
        let bound = self.video.src_object();
        if bound.is_some_and(|bound| Object::is(&bound, &stream)) {
            self.video.set_src_object(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn camera() -> WebCamera {
        let document = web_sys::window().unwrap().document().unwrap();
        let video = document.create_element("video").unwrap().dyn_into().unwrap();
        let canvas = document.create_element("canvas").unwrap().dyn_into().unwrap();
        WebCamera::new(video, canvas)
    }

    fn bound_to(camera: &WebCamera, stream: &MediaStream) -> bool {
        camera
            .video
            .src_object()
            .is_some_and(|bound| Object::is(&bound, stream))
    }

    #[wasm_bindgen_test]
    fn closing_a_stale_stream_keeps_the_live_one_bound() {
        let camera = camera();
        let live = MediaStream::new().unwrap();
        let stale = MediaStream::new().unwrap();
        camera.video.set_src_object(Some(&live));

        camera.close(stale);
        assert!(bound_to(&camera, &live));

        camera.close(live);
        assert!(camera.video.src_object().is_none());
    }

    #[wasm_bindgen_test]
    async fn older_request_never_rebinds_the_video() {
        let camera = camera();
        let live = MediaStream::new().unwrap();
        camera.video.set_src_object(Some(&live));
        camera.latest.set(2);

        let stale = MediaStream::new().unwrap();
        assert!(camera.attach(&stale, 1, 50).await.is_err());
        assert!(bound_to(&camera, &live));
    }
}
