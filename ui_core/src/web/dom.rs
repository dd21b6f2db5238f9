// View over the host page's DOM. Content is written with text nodes only.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlTextAreaElement, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::render::{BreakdownRow, HistoryRow, ResultView, StatTile};
use crate::text::CharCount;
use crate::types::Mode;
use crate::view::{CameraLayout, Control, Notice, View};

pub const TEXT_INPUT: &str = "textInput";
pub const ANALYZE_BTN: &str = "analyzeBtn";
pub const START_CAMERA_BTN: &str = "startCameraBtn";
pub const CAPTURE_BTN: &str = "captureBtn";
pub const STOP_CAMERA_BTN: &str = "stopCameraBtn";
pub const VIDEO: &str = "videoElement";
pub const CANVAS: &str = "canvasElement";
pub const MODE_TABS: &str = ".mode-tab[data-mode]";

pub struct DomView {
    document: Document,
    notice_ms: u32,
    toast_timer: RefCell<Option<Timeout>>,
}

type DomResult = Result<(), JsValue>;

fn logged(what: &str, outcome: DomResult) {
    if let Err(err) = outcome {
        warn!("Could not {}: {:?}", what, err);
    }
}

fn missing(id: &str) -> JsValue {
    JsValue::from_str(&format!("element #{} not found", id))
}

fn set_display(element: &HtmlElement, value: &str) -> DomResult {
    element.style().set_property("display", value)
}

impl DomView {
    pub fn new(document: Document, notice_ms: u32) -> Self {
        DomView {
            document,
            notice_ms,
            toast_timer: RefCell::new(None),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn by_id<T: JsCast>(&self, id: &str) -> Result<T, JsValue> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<T>().ok())
            .ok_or_else(|| missing(id))
    }

    fn node(&self, tag: &str, class: &str, text: Option<&str>) -> Result<HtmlElement, JsValue> {
        let element: HtmlElement = self.document.create_element(tag)?.dyn_into()?;
        element.set_class_name(class);
        if let Some(text) = text {
            element.set_text_content(Some(text));
        }
        Ok(element)
    }

    fn clear(&self, id: &str) -> Result<HtmlElement, JsValue> {
        let container: HtmlElement = self.by_id(id)?;
        container.set_text_content(None);
        Ok(container)
    }

    fn paint_modes(&self, mode: Mode) -> DomResult {
        let tabs = self.document.query_selector_all(MODE_TABS)?;
        for i in 0..tabs.length() {
            if let Some(tab) = tabs.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                let selected = tab.get_attribute("data-mode").as_deref() == Some(mode.tab());
                tab.class_list().toggle_with_force("active", selected)?;
            }
        }

        for (id, panel_mode) in [("textMode", Mode::Text), ("faceMode", Mode::Face)] {
            let panel: HtmlElement = self.by_id(id)?;
            let shown = panel_mode == mode;
            set_display(&panel, if shown { "block" } else { "none" })?;
            panel.class_list().toggle_with_force("active", shown)?;
        }
        Ok(())
    }

    fn paint_count(&self, count: &CharCount) -> DomResult {
        let label: HtmlElement = self.by_id("charCount")?;
        label.set_text_content(Some(&count.label()));
        label.style().set_property("color", count.level.color())
    }

    fn paint_layout(&self, layout: CameraLayout) -> DomResult {
        let live = layout == CameraLayout::Live;
        let (hidden_when_live, shown_when_live) = if live {
            ("none", "inline-flex")
        } else {
            ("inline-flex", "none")
        };
        set_display(&self.by_id::<HtmlElement>("cameraOverlay")?, if live { "none" } else { "flex" })?;
        set_display(&self.by_id::<HtmlElement>(START_CAMERA_BTN)?, hidden_when_live)?;
        set_display(&self.by_id::<HtmlElement>(CAPTURE_BTN)?, shown_when_live)?;
        set_display(&self.by_id::<HtmlElement>(STOP_CAMERA_BTN)?, shown_when_live)
    }

    fn paint_result(&self, result: &ResultView) -> DomResult {
        let section: HtmlElement = self.by_id("resultsSection")?;
        set_display(&section, "block")?;
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Nearest);
        section.scroll_into_view_with_scroll_into_view_options(&options);

        self.by_id::<HtmlElement>("emotionIcon")?
            .set_text_content(Some(result.glyph));
        let name: HtmlElement = self.by_id("emotionName")?;
        name.set_text_content(Some(result.label));
        name.style().set_property("color", result.color)?;

        let fill: HtmlElement = self.by_id("confidenceFill")?;
        fill.style()
            .set_property("width", &format!("{}%", result.confidence_percent))?;
        fill.style().set_property("background-color", result.color)?;
        self.by_id::<HtmlElement>("confidenceText")?
            .set_text_content(Some(&result.confidence_label));

        if let Some(block) = self.document.query_selector(".sentiment-info")? {
            let block: HtmlElement = block.dyn_into()?;
            match &result.sentiment {
                Some(sentiment) => {
                    set_display(&block, "block")?;
                    let polarity: HtmlElement = self.by_id("polarityValue")?;
                    polarity.set_text_content(Some(&sentiment.polarity));
                    polarity.style().set_property("color", sentiment.polarity_color)?;
                    let subjectivity: HtmlElement = self.by_id("subjectivityValue")?;
                    subjectivity.set_text_content(Some(&sentiment.subjectivity));
                    subjectivity
                        .style()
                        .set_property("color", sentiment.subjectivity_color)?;
                }
                None => set_display(&block, "none")?,
            }
        }

        let chart = self.clear("emotionsChart")?;
        for row in &result.breakdown {
            chart.append_child(&self.bar(row)?)?;
        }
        Ok(())
    }

    fn bar(&self, row: &BreakdownRow) -> Result<HtmlElement, JsValue> {
        let bar = self.node("div", "emotion-bar", None)?;

        let label = self.node("div", "emotion-label", None)?;
        label.append_child(&self.node("span", "emotion-emoji", Some(row.glyph))?)?;
        label.append_child(&self.node("span", "", Some(row.label))?)?;
        bar.append_child(&label)?;

        let track = self.node("div", "emotion-progress", None)?;
        let fill = self.node("div", "emotion-progress-fill", row.inner_label.as_deref())?;
        fill.style().set_property("width", &format!("{}%", row.percent))?;
        fill.style().set_property("background-color", row.color)?;
        track.append_child(&fill)?;
        bar.append_child(&track)?;

        bar.append_child(&self.node("div", "emotion-value", Some(&row.readout))?)?;
        Ok(bar)
    }

    fn paint_history(&self, rows: &[HistoryRow]) -> DomResult {
        let list = self.clear("historyList")?;
        for row in rows {
            let item = self.node("div", "history-item", None)?;
            item.style().set_property("border-left-color", row.color)?;

            let header = self.node("div", "history-header", None)?;
            let emotion = format!("{} {}", row.glyph, row.label);
            header.append_child(&self.node("div", "history-emotion", Some(&emotion))?)?;
            header.append_child(&self.node("div", "history-confidence", Some(&row.confidence))?)?;
            item.append_child(&header)?;
            item.append_child(&self.node("div", "history-text", Some(&row.text))?)?;
            item.append_child(&self.node("div", "history-time", Some(&row.timestamp))?)?;
            list.append_child(&item)?;
        }
        Ok(())
    }

    fn paint_stats(&self, tiles: &[StatTile]) -> DomResult {
        let grid = self.clear("statsGrid")?;
        for tile in tiles {
            let item = self.node("div", "stat-item", None)?;
            let value = match tile.glyph {
                Some(glyph) => format!("{} {}", glyph, tile.value),
                None => tile.value.clone(),
            };
            let value = self.node("div", "stat-value", Some(&value))?;
            if let Some(color) = tile.color {
                value.style().set_property("color", color)?;
            }
            item.append_child(&value)?;
            item.append_child(&self.node("div", "stat-label", Some(&tile.label))?)?;
            grid.append_child(&item)?;
        }
        Ok(())
    }

    fn paint_notice(&self, notice: &Notice) -> DomResult {
        let toast: HtmlElement = self.by_id("toast")?;
        toast.set_text_content(Some(&notice.message));
        toast.set_class_name(&format!("toast {}", notice.kind.class_name()));
        toast.class_list().add_1("show")?;

        // Replacing the handle cancels the previous hide.
        let hide = Timeout::new(self.notice_ms, move || {
            let _ = toast.class_list().remove_1("show");
        });
        *self.toast_timer.borrow_mut() = Some(hide);
        Ok(())
    }

    fn control(&self, control: Control) -> Result<HtmlButtonElement, JsValue> {
        self.by_id(match control {
            Control::Analyze => ANALYZE_BTN,
            Control::Capture => CAPTURE_BTN,
        })
    }
}

impl View for DomView {
    fn show_mode(&self, mode: Mode) {
        logged("switch mode panels", self.paint_modes(mode));
    }

    fn set_char_count(&self, count: &CharCount) {
        logged("update the character counter", self.paint_count(count));
    }

    fn set_text_input(&self, text: &str) {
        match self.by_id::<HtmlTextAreaElement>(TEXT_INPUT) {
            Ok(input) => input.set_value(text),
            Err(err) => logged("fill the text input", Err(err)),
        }
    }

    fn focus_text_input(&self) {
        logged(
            "focus the text input",
            self.by_id::<HtmlTextAreaElement>(TEXT_INPUT)
                .and_then(|input| input.focus()),
        );
    }

    fn set_control_enabled(&self, control: Control, enabled: bool) {
        match self.control(control) {
            Ok(button) => button.set_disabled(!enabled),
            Err(err) => logged("toggle a control", Err(err)),
        }
    }

    fn set_busy(&self, busy: bool) {
        logged(
            "toggle the loading overlay",
            self.by_id::<HtmlElement>("loadingOverlay")
                .and_then(|overlay| set_display(&overlay, if busy { "flex" } else { "none" })),
        );
    }

    fn set_camera_layout(&self, layout: CameraLayout) {
        logged("lay out the camera panel", self.paint_layout(layout));
    }

    fn show_result(&self, result: &ResultView) {
        logged("render the result", self.paint_result(result));
    }

    fn hide_result(&self) {
        logged(
            "hide the result",
            self.by_id::<HtmlElement>("resultsSection")
                .and_then(|section| set_display(&section, "none")),
        );
    }

    fn show_history(&self, rows: &[HistoryRow]) {
        logged("render history", self.paint_history(rows));
    }

    fn show_stats(&self, tiles: &[StatTile]) {
        logged("render stats", self.paint_stats(tiles));
    }

    fn notify(&self, notice: &Notice) {
        logged("show a notification", self.paint_notice(notice));
    }
}
