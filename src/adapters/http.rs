//! HTTP server adapter.
//!
//! Routes every request to [`SharedFeeder`](crate::app::shared::SharedFeeder).
//! Decoding and encoding live in [`crate::api`]; this module only moves
//! bytes between the ESP-IDF server and those functions.

#[cfg(target_os = "espidf")]
pub use server::start;

#[cfg(target_os = "espidf")]
mod server {
    use std::sync::Arc;

    use anyhow::anyhow;
    use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
    use esp_idf_svc::http::{Headers, Method};
    use esp_idf_svc::io::{Read, Write};
    use log::{info, warn};
    use serde::Serialize;

    use crate::adapters::DeviceFeeder;
    use crate::api;
    use crate::config::FeederConfig;
    use crate::error::{Error, RequestError};

    type Req<'r, 'c> = Request<&'r mut EspHttpConnection<'c>>;

    /// Start the server and register every route.  The returned server
    /// must be kept alive for the routes to stay registered.
    pub fn start(
        feeder: Arc<DeviceFeeder>,
        config: &FeederConfig,
    ) -> anyhow::Result<EspHttpServer<'static>> {
        let conf = Configuration {
            stack_size: config.http_stack_size,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf)?;

        server.fn_handler::<anyhow::Error, _>("/", Method::Get, move |req| {
            req.into_response(200, Some("OK"), &[("Content-Type", "text/html")])?
                .write_all(api::INDEX_HTML.as_bytes())?;
            Ok(())
        })?;

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/feed", Method::Get, move |req| {
                let receipt = feeder.feed_now();
                write_text(req, 200, &api::feed_text(&receipt))
            })?;
        }

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/set_timer", Method::Get, move |req| {
                match api::parse_set_timer(req.uri()) {
                    Ok(minutes) => {
                        feeder.set_auto_feed_interval(minutes);
                        write_text(req, 200, &api::set_timer_text(minutes))
                    }
                    Err(e) => reject_text(req, e),
                }
            })?;
        }

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/get_timer", Method::Get, move |req| {
                write_text(req, 200, &api::get_timer_text(feeder.auto_feed_interval()))
            })?;
        }

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/set_pwm", Method::Post, move |mut req| {
                let update = match read_request_body(&mut req).and_then(|b| api::parse_set_pwm(&b)) {
                    Ok(update) => update,
                    Err(e) => return reject_json(req, e),
                };
                let outcome = feeder.apply_pwm_update(&update);
                write_json(req, api::pwm_status(&outcome), &api::PwmResponse::from(&outcome))
            })?;
        }

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/settings", Method::Get, move |req| {
                write_json(req, 200, &feeder.settings())
            })?;
        }

        {
            let feeder = feeder.clone();
            server.fn_handler::<anyhow::Error, _>("/set_range", Method::Post, move |mut req| {
                let range = match read_request_body(&mut req).and_then(|b| api::parse_set_range(&b)) {
                    Ok(range) => range,
                    Err(e) => return reject_json(req, e),
                };
                match feeder.set_clamp_range(range.min, range.max) {
                    Ok(_) => write_json(req, 200, &feeder.settings()),
                    Err(e) => {
                        let e = Error::from(e);
                        warn!("HTTP: /set_range rejected: {}", e);
                        write_json(req, 400, &api::ErrorBody { error: &e.to_string() })
                    }
                }
            })?;
        }

        info!("HTTP: server started ({} byte stack)", config.http_stack_size);
        Ok(server)
    }

    fn read_request_body(req: &mut Req<'_, '_>) -> Result<Vec<u8>, RequestError> {
        let len = api::check_body_len(req.content_len().unwrap_or(0) as usize)?;
        let mut body = vec![0_u8; len];
        if len > 0 {
            req.read_exact(&mut body).map_err(|_| RequestError::InvalidJson)?;
        }
        Ok(body)
    }

    fn write_text(req: Req<'_, '_>, status: u16, body: &str) -> anyhow::Result<()> {
        req.into_response(status, None, &[("Content-Type", "text/plain")])?
            .write_all(body.as_bytes())?;
        Ok(())
    }

    fn write_json<T: Serialize>(req: Req<'_, '_>, status: u16, payload: &T) -> anyhow::Result<()> {
        let body = serde_json::to_vec(payload).map_err(|e| anyhow!("encode: {e}"))?;
        req.into_response(
            status,
            None,
            &[("Content-Type", "application/json; charset=utf-8")],
        )?
        .write_all(&body)?;
        Ok(())
    }

    fn reject_text(req: Req<'_, '_>, e: RequestError) -> anyhow::Result<()> {
        warn!("HTTP: {} {}: {}", req.uri(), e.status(), Error::from(e));
        write_text(req, e.status(), &e.to_string())
    }

    fn reject_json(req: Req<'_, '_>, e: RequestError) -> anyhow::Result<()> {
        warn!("HTTP: {} {}: {}", req.uri(), e.status(), Error::from(e));
        write_json(req, e.status(), &api::ErrorBody { error: &e.to_string() })
    }
}
