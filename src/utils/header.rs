//! Alert headers that tell a client what a mutation did, e.g.
//! `X-personnelApp-alert: personnelApp.employee.created` with the entity id
//! in `X-personnelApp-params`.

pub type Header = (String, String);

pub fn alert(app_name: &str, message: &str, param: &str) -> [Header; 2] {
    [
        (format!("X-{}-alert", app_name), message.to_string()),
        (format!("X-{}-params", app_name), param.to_string()),
    ]
}

pub fn entity_creation_alert(app_name: &str, entity_name: &str, param: &str) -> [Header; 2] {
    alert(app_name, &format!("{}.{}.created", app_name, entity_name), param)
}

pub fn entity_update_alert(app_name: &str, entity_name: &str, param: &str) -> [Header; 2] {
    alert(app_name, &format!("{}.{}.updated", app_name, entity_name), param)
}

pub fn entity_deletion_alert(app_name: &str, entity_name: &str, param: &str) -> [Header; 2] {
    alert(app_name, &format!("{}.{}.deleted", app_name, entity_name), param)
}
