use serde_json::Value;

/// Drops empty string values from every object nested directly under the
/// body, so `{"poem": {"title": ""}}` becomes `{"poem": {}}`.
pub fn remove_blank_fields(body: &mut Value) {
	let Value::Object(body) = body else {
		return;
	};

	for value in body.values_mut() {
		if let Value::Object(fields) = value {
			fields.retain(|_, field| !matches!(field, Value::String(s) if s.is_empty()));
		}
	}
}
