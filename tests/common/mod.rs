#![allow(dead_code)]

use myair3::Coordinator;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn system_xml(power: u8, mode: u8, fan: u8, zones: u8) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<iZS10.3>
  <request>getSystemData</request>
  <authenticated>1</authenticated>
  <system>
    <unitcontrol>
      <airconOnOff>{power}</airconOnOff>
      <mode>{mode}</mode>
      <fanSpeed>{fan}</fanSpeed>
      <centralDesiredTemp>24.0</centralDesiredTemp>
      <centralActualTemp>25.5</centralActualTemp>
      <numberOfZones>{zones}</numberOfZones>
    </unitcontrol>
  </system>
</iZS10.3>"#
    )
}

pub fn zone_xml(id: u8, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<iZS10.3>
  <request>getZoneData</request>
  <zone{id}>{body}</zone{id}>
</iZS10.3>"#
    )
}

pub fn plain_zone_xml(id: u8, setting: u8) -> String {
    zone_xml(
        id,
        &format!(
            "<name>Zone Name {id}</name><setting>{setting}</setting>\
             <desiredTemp>22.0</desiredTemp><actualTemp>21.0</actualTemp>\
             <userPercentSetting>100</userPercentSetting><hasLowBatt>0</hasLowBatt>"
        ),
    )
}

pub const LOGIN_BODY: &str = "<iZS10.3><authenticated>1</authenticated></iZS10.3>";
pub const ACK_BODY: &str = "<iZS10.3><ack>1</ack></iZS10.3>";

pub async fn mount_login(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .and(query_param("password", "password"))
        .respond_with(ResponseTemplate::new(status).set_body_string(LOGIN_BODY))
        .mount(server)
        .await;
}

pub async fn mount_system(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/getSystemData"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_zone(server: &MockServer, id: u8, body: String) {
    Mock::given(method("GET"))
        .and(path("/getZoneData"))
        .and(query_param("zone", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Login, a powered-on cooling system, and `zones` ordinary zones.
pub async fn mount_device(server: &MockServer, zones: u8) {
    mount_login(server, 200).await;
    mount_system(server, system_xml(1, 1, 2, zones)).await;
    for id in 1..=zones {
        mount_zone(server, id, plain_zone_xml(id, 1)).await;
    }
}

pub fn coordinator(server: &MockServer) -> Coordinator {
    let addr = server.address();
    Coordinator::builder(format!("{}:{}", addr.ip(), addr.port()))
        .build()
        .expect("coordinator should build")
}

/// `path?query` of every request the server saw, in arrival order.
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|r| match r.url.query() {
            Some(q) => format!("{}?{}", r.url.path(), q),
            None => r.url.path().to_string(),
        })
        .collect()
}

pub async fn count_requests(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .count()
}
