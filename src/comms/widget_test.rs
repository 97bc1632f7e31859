use super::*;
use crate::test_support::{
    FakeFrame, FakeWidgets, Fakes, FrameReply, INSTANCE_API_ENDPOINT_URL, INSTANCE_URL,
    THIRD_PARTY_PAGE, WIDGET_SRC,
};
use bridge::{API_EVENT_TYPE, CLIENT_NAME};
use futures::executor::block_on;

fn reply(status: u16, status_text: &str, data: Value) -> Value {
    serde_json::json!({
        "source": CLIENT_NAME,
        "event_type": API_EVENT_TYPE,
        "api_response": {"status": status, "statusText": status_text, "data": data}
    })
}

fn widget_comms(fakes: &Fakes) -> WidgetComms {
    WidgetComms::new(&ClientConfig::new(INSTANCE_URL), &fakes.host())
}

/// Widget comms whose freshly mounted iframe has fired `load`.
fn ready_comms(fakes: &Fakes) -> (WidgetComms, std::rc::Rc<FakeFrame>) {
    let comms = widget_comms(fakes);
    let frame = fakes.widgets.mounted_frame().expect("frame mounted");
    frame.fire_load();
    (comms, frame)
}

// =============================================================================
// MOUNTING
// =============================================================================

#[test]
fn new_mounts_hidden_widget_through_app_host() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let comms = widget_comms(&fakes);

    assert_eq!(*fakes.widgets.created_containers.borrow(), vec!["customerprofiles-container"]);
    assert_eq!(
        *fakes.widgets.inits.borrow(),
        vec![AppInit {
            name: "AmazonConnectCustomerProfilesClient".to_owned(),
            container_id: "customerprofiles-container".to_owned(),
            url: "https://www.instanceurl.aws.com/customerprofiles-v2".to_owned(),
            style: "display: none".to_owned(),
        }]
    );
    assert!(comms.widget().is_some());
    assert!(!comms.is_ready());
}

#[test]
fn new_reuses_existing_container() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    fakes
        .widgets
        .containers
        .borrow_mut()
        .push("customerprofiles-container".to_owned());

    let _comms = widget_comms(&fakes);

    assert!(fakes.widgets.created_containers.borrow().is_empty());
    assert_eq!(fakes.widgets.inits.borrow().len(), 1);
}

#[test]
fn load_event_marks_widget_ready() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let comms = widget_comms(&fakes);
    let frame = fakes.widgets.mounted_frame().expect("frame mounted");
    assert_eq!(frame.load_listener_count(), 1);

    frame.fire_load();
    assert!(comms.is_ready());

    // A reload keeps it ready.
    frame.fire_load();
    assert!(comms.is_ready());
}

#[test]
fn existing_iframe_is_reused_and_ready() {
    let mut fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let frame = FakeFrame::new(WIDGET_SRC);
    fakes.widgets = FakeWidgets::with_existing(std::rc::Rc::clone(&frame));

    let comms = widget_comms(&fakes);

    assert!(comms.is_ready());
    assert!(fakes.widgets.inits.borrow().is_empty());
    assert!(fakes.widgets.created_containers.borrow().is_empty());
    assert_eq!(frame.load_listener_count(), 0);
}

#[test]
fn missing_app_host_leaves_widget_unmounted() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    fakes.widgets.app_host_installed.set(false);

    let comms = widget_comms(&fakes);

    assert!(comms.widget().is_none());
    assert!(!comms.is_ready());
    let err = block_on(comms.api_call(Operation::CreateProfile, None)).expect_err("not ready");
    assert!(err.is_not_ready());
}

#[test]
fn iframe_missing_after_init_leaves_widget_unmounted() {
    let mut fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    fakes.widgets = FakeWidgets::empty(None);

    let comms = widget_comms(&fakes);

    assert_eq!(fakes.widgets.inits.borrow().len(), 1);
    assert!(comms.widget().is_none());
}

// =============================================================================
// CALLS
// =============================================================================

#[test]
fn call_before_load_is_rejected_without_channel() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let comms = widget_comms(&fakes);
    let frame = fakes.widgets.mounted_frame().expect("frame mounted");

    let err = block_on(comms.api_call(Operation::CreateProfile, None)).expect_err("not ready");

    assert_eq!(
        err.response(),
        Some(&ApiResponse {
            status: 500,
            status_text: "Client not ready".to_owned(),
            data: serde_json::json!({}),
        })
    );
    assert!(frame.exchanges.borrow().is_empty());
}

#[test]
fn call_posts_request_to_widget_origin() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(reply(200, "OK", serde_json::json!("TestResponse"))));

    block_on(comms.api_call(Operation::CreateProfile, Some(serde_json::json!({"a": 1, "b": 2}))))
        .expect("call");

    let exchanges = frame.exchanges.borrow();
    assert_eq!(exchanges.len(), 1);
    let (message, origin) = &exchanges[0];
    assert_eq!(origin, WIDGET_SRC);
    assert_eq!(
        message.to_value(),
        serde_json::json!({
            "source": CLIENT_NAME,
            "event_type": API_EVENT_TYPE,
            "api_data": {
                "url": INSTANCE_API_ENDPOINT_URL,
                "method": "createProfile",
                "params": {"a": 1, "b": 2}
            }
        })
    );
}

#[test]
fn ok_reply_resolves_with_full_response() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(reply(200, "OK", serde_json::json!({"Items": []}))));

    let resp = block_on(comms.api_call(Operation::SearchProfiles, None)).expect("call");

    assert_eq!(
        resp,
        ApiResponse {
            status: 200,
            status_text: "OK".to_owned(),
            data: serde_json::json!({"Items": []}),
        }
    );
}

#[test]
fn error_reply_rejects_with_response() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(reply(400, "Error", serde_json::json!({}))));

    let err = block_on(comms.api_call(Operation::UpdateProfile, None)).expect_err("call fails");

    assert_eq!(err.response(), Some(&ApiResponse::failure(400, "Error")));
}

#[test]
fn each_call_opens_its_own_channel() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(reply(200, "OK", serde_json::json!(1))));
    frame.queue_reply(FrameReply::Send(reply(200, "OK", serde_json::json!(2))));

    let first = block_on(comms.api_call(Operation::ListProfileObjects, None)).expect("first");
    let second = block_on(comms.api_call(Operation::ListProfileObjects, None)).expect("second");

    assert_eq!(first.data, serde_json::json!(1));
    assert_eq!(second.data, serde_json::json!(2));
    assert_eq!(frame.exchanges.borrow().len(), 2);
}

#[test]
fn channel_setup_failure_becomes_host_error() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.fail_exchange.set(true);

    let err = block_on(comms.api_call(Operation::CreateProfile, None)).expect_err("post throws");

    assert!(matches!(err, Error::Host(HostError::Js(_))));
}

#[test]
fn closed_port_becomes_host_error() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Close);

    let err = block_on(comms.api_call(Operation::CreateProfile, None)).expect_err("port closed");

    assert!(matches!(err, Error::Host(HostError::PortClosed)));
}

#[test]
fn reply_without_api_response_is_rejected() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(serde_json::json!({"source": CLIENT_NAME})));

    let err = block_on(comms.api_call(Operation::CreateProfile, None)).expect_err("bad reply");

    assert!(matches!(err, Error::Bridge(_)));
}

#[test]
fn status_less_reply_rejects_with_response() {
    let fakes = Fakes::at(Some(THIRD_PARTY_PAGE));
    let (comms, frame) = ready_comms(&fakes);
    frame.queue_reply(FrameReply::Send(serde_json::json!({
        "source": CLIENT_NAME,
        "event_type": API_EVENT_TYPE,
        "api_response": {"data": {}}
    })));

    let err = block_on(comms.api_call(Operation::SearchProfiles, None)).expect_err("network failure");

    assert_eq!(err.response(), Some(&ApiResponse::failure(0, "")));
}
