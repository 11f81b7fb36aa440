use opendie_erc::{ErcConfig, RuleChecker, Severity, ViolationClass, ViolationKind};
use opendie_model::{LogicModel, ObjectId, PortDirection};

/// Small gate library: an inverter, a tri-state buffer and a cell whose
/// enable port nobody has classified yet.
struct Library {
    inv: ObjectId,
    tbuf: ObjectId,
    unknown: ObjectId,
}

fn create_library(model: &mut LogicModel) -> Library {
    let inv = model.add_template("INV").unwrap();
    model.add_template_port(inv, "A", PortDirection::In).unwrap();
    model.add_template_port(inv, "Y", PortDirection::Out).unwrap();

    let tbuf = model.add_template("TBUF").unwrap();
    model.add_template_port(tbuf, "A", PortDirection::In).unwrap();
    model.add_template_port(tbuf, "Y", PortDirection::Out).unwrap();

    let unknown = model.add_template("UNK").unwrap();
    model
        .add_template_port(unknown, "EN", PortDirection::Undefined)
        .unwrap();

    Library { inv, tbuf, unknown }
}

fn connect(model: &mut LogicModel, net: ObjectId, gate: ObjectId, port: &str) {
    let port = model.gate_port(gate, port).unwrap();
    model.connect(net, port).unwrap();
}

#[test]
fn test_three_net_model() {
    let mut model = LogicModel::new("three_nets");
    let lib = create_library(&mut model);
    let u1 = model.add_gate("U1", lib.inv).unwrap();
    let u2 = model.add_gate("U2", lib.inv).unwrap();
    let u3 = model.add_gate("U3", lib.tbuf).unwrap();
    let u4 = model.add_gate("U4", lib.unknown).unwrap();

    // A: one driver, one receiver.
    let net_a = model.add_net().unwrap();
    connect(&mut model, net_a, u1, "Y");
    connect(&mut model, net_a, u2, "A");

    // B: two drivers, no receiver.
    let net_b = model.add_net().unwrap();
    connect(&mut model, net_b, u2, "Y");
    connect(&mut model, net_b, u3, "Y");

    // C: one undefined port, one receiver.
    let net_c = model.add_net().unwrap();
    connect(&mut model, net_c, u4, "EN");
    connect(&mut model, net_c, u3, "A");

    let violations = RuleChecker::new().run(&model).unwrap().into_violations();

    assert!(violations.iter().all(|v| v.kind().net() != net_a));

    let on_b: Vec<_> = violations
        .iter()
        .filter(|v| v.kind().net() == net_b)
        .map(|v| v.class())
        .collect();
    assert_eq!(
        on_b,
        vec![
            ViolationClass::UniformDirection,
            ViolationClass::MultipleDrivers
        ]
    );

    let on_c: Vec<_> = violations
        .iter()
        .filter(|v| v.kind().net() == net_c)
        .collect();
    assert_eq!(on_c.len(), 1);
    assert_eq!(
        on_c[0].kind(),
        &ViolationKind::UndefinedDirection {
            net: net_c,
            port: model.gate_port(u4, "EN").unwrap()
        }
    );
    assert!(on_c[0].description().contains("U4.EN"));

    assert_eq!(violations.len(), 3);
    // Every record points at an object of the model.
    assert!(violations.iter().all(|v| model.object_exists(v.object_id())));
}

#[test]
fn test_fixing_template_clears_violation() {
    let mut model = LogicModel::new("fix");
    let lib = create_library(&mut model);
    let driver = model.add_gate("U1", lib.unknown).unwrap();
    let receiver = model.add_gate("U2", lib.inv).unwrap();
    let net = model.add_net().unwrap();
    connect(&mut model, net, driver, "EN");
    connect(&mut model, net, receiver, "A");

    let checker = RuleChecker::new();
    assert_eq!(checker.run(&model).unwrap().len(), 1);

    let en = model
        .get_template(lib.unknown)
        .and_then(|t| t.find_port_by_name("EN"))
        .map(|p| p.id)
        .unwrap();
    model
        .set_port_direction(lib.unknown, en, PortDirection::Out)
        .unwrap();
    assert!(checker.run(&model).unwrap().is_empty());
}

#[test]
fn test_output_follows_net_order() {
    let mut model = LogicModel::new("order");
    let lib = create_library(&mut model);
    let mut nets = Vec::new();
    for i in 0..4 {
        let gate = model.add_gate(&format!("U{}", i), lib.inv).unwrap();
        let net = model.add_net().unwrap();
        connect(&mut model, net, gate, "Y");
        nets.push(net);
    }

    let report = RuleChecker::new().run(&model).unwrap();
    let seen: Vec<_> = report.violations().iter().map(|v| v.object_id()).collect();
    assert_eq!(seen, nets);
}

#[test]
fn test_config_from_json() {
    let mut model = LogicModel::new("cfg");
    let lib = create_library(&mut model);
    let gate = model.add_gate("U1", lib.inv).unwrap();
    let net = model.add_net().unwrap();
    connect(&mut model, net, gate, "A");

    let config =
        ErcConfig::from_json(r#"{"severities": {"net.uniform_port_direction": "error"}}"#).unwrap();
    let report = RuleChecker::new().with_config(config).run(&model).unwrap();
    assert_eq!(report.violations()[0].severity(), Severity::Error);
    assert!(report.has_errors());
}
