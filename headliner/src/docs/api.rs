/*!
# Headliner API documentation

This page describes the API endpoints available on Headliner.

## News proxy

Endpoint: `/api/news` (configurable as `proxy.path`)

Example: `/api/news?endpoint=everything&q=open%20source&pageSize=10`

The proxy accepts the same query parameters as the news service, plus
`endpoint`, and forwards the request with the server's credential attached.
Browsers use it so that the credential never reaches them.

### Query Parameters

- `endpoint` - Required. Either `top-headlines` or `everything`. Any other
  value, or none, is answered with `400` and the news service is not
  contacted.
- Every other parameter is passed to the news service unchanged, in the order
  it was received.

### Methods

`GET` is forwarded. `OPTIONS` is answered with `200` and an empty body, so
browsers can make cross-origin requests. Anything else is answered with `405`.

### Response

The status and body of the news service are returned unchanged. This includes
errors like `401` for a rejected credential and `429` when rate limited.

When the proxy itself fails, it answers with a JSON body like
`{"error": "...", "kind": "network_error"}` and names the kind in the
`X-Headliner-Error` header, so clients can tell its errors apart from the news
service's.

## Dockerflow

Headliner implements the [Dockerflow][] endpoints.

- `/__lbheartbeat__` - Answers `200` with an empty body.
- `/__heartbeat__` - The version, and whether a credential is configured.
- `/__version__` - The contents of `version.json`.
- `/__error__` - Always fails, to test error handling.

[Dockerflow]: https://github.com/mozilla-services/Dockerflow
*/
