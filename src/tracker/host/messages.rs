use serde::{Deserialize, Serialize};

use crate::tracker::{
    storage::entities::TimeLogs,
    tabs::{TabId, TabInfo, WindowId},
};

/// Anything the extension can send to the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HostMessage {
    Control(ControlMessage),
    Event(BrowserEvent),
}

/// Browser events forwarded by the extension.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BrowserEvent {
    /// The active tab of a window changed.
    TabActivated { tab_id: TabId, window_id: WindowId },
    /// A tab was created or changed. `url_changed` tells whether the user navigated.
    TabUpdated {
        tab: TabInfo,
        #[serde(default)]
        url_changed: bool,
    },
    TabRemoved { tab_id: TabId },
    /// `None` (or [crate::tracker::tabs::WINDOW_ID_NONE]) means the browser lost focus.
    WindowFocusChanged { window_id: Option<WindowId> },
    IdleStateChanged { state: IdleState },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

/// Requests from the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlMessage {
    GetPopupData,
    TogglePause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    PopupData(PopupData),
    PauseState(PauseState),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupData {
    pub is_paused: bool,
    pub time_logs: TimeLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseState {
    pub is_paused: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::tracker::{storage::entities::TimeLogs, tabs::TabInfo};

    use super::{
        BrowserEvent, ControlMessage, ControlReply, HostMessage, IdleState, PauseState, PopupData,
    };

    fn parse(value: serde_json::Value) -> HostMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_tab_events() {
        assert_eq!(
            parse(json!({ "type": "tabActivated", "tabId": 4, "windowId": 1 })),
            HostMessage::Event(BrowserEvent::TabActivated {
                tab_id: 4,
                window_id: 1
            })
        );
        assert_eq!(
            parse(json!({
                "type": "tabUpdated",
                "tab": { "id": 4, "windowId": 1, "url": "https://a.com/", "active": true },
                "urlChanged": true,
            })),
            HostMessage::Event(BrowserEvent::TabUpdated {
                tab: TabInfo {
                    id: 4,
                    window_id: 1,
                    url: Some("https://a.com/".into()),
                    active: true,
                },
                url_changed: true,
            })
        );
        assert_eq!(
            parse(json!({ "type": "tabUpdated", "tab": { "id": 4, "windowId": 1 } })),
            HostMessage::Event(BrowserEvent::TabUpdated {
                tab: TabInfo {
                    id: 4,
                    window_id: 1,
                    url: None,
                    active: false,
                },
                url_changed: false,
            })
        );
        assert_eq!(
            parse(json!({ "type": "tabRemoved", "tabId": 4 })),
            HostMessage::Event(BrowserEvent::TabRemoved { tab_id: 4 })
        );
    }

    #[test]
    fn test_parse_focus_and_idle() {
        assert_eq!(
            parse(json!({ "type": "windowFocusChanged", "windowId": null })),
            HostMessage::Event(BrowserEvent::WindowFocusChanged { window_id: None })
        );
        assert_eq!(
            parse(json!({ "type": "windowFocusChanged", "windowId": -1 })),
            HostMessage::Event(BrowserEvent::WindowFocusChanged {
                window_id: Some(-1)
            })
        );
        assert_eq!(
            parse(json!({ "type": "idleStateChanged", "state": "locked" })),
            HostMessage::Event(BrowserEvent::IdleStateChanged {
                state: IdleState::Locked
            })
        );
    }

    #[test]
    fn test_parse_control() {
        assert_eq!(
            parse(json!({ "type": "getPopupData" })),
            HostMessage::Control(ControlMessage::GetPopupData)
        );
        assert_eq!(
            parse(json!({ "type": "togglePause" })),
            HostMessage::Control(ControlMessage::TogglePause)
        );
    }

    #[test]
    fn test_reject_unknown() {
        assert!(serde_json::from_value::<HostMessage>(json!({ "type": "reload" })).is_err());
        assert!(serde_json::from_value::<HostMessage>(
            json!({ "type": "idleStateChanged", "state": "asleep" })
        )
        .is_err());
    }

    #[test]
    fn test_reply_shapes() {
        let popup = ControlReply::PopupData(PopupData {
            is_paused: false,
            time_logs: TimeLogs::from([("https://a.com".into(), 10)]),
        });
        assert_eq!(
            serde_json::to_value(popup).unwrap(),
            json!({ "isPaused": false, "timeLogs": { "https://a.com": 10 } })
        );
        assert_eq!(
            serde_json::to_value(ControlReply::PauseState(PauseState { is_paused: true }))
                .unwrap(),
            json!({ "isPaused": true })
        );
    }
}
