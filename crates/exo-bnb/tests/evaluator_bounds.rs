use exo_bnb::{BoundEvaluator, Region, VerifyRecord, FIXED_POINT_ONE};
use exo_core::{ExoError, FailureClass, VerifierConfig};
use exo_num::{Float, Round};

fn hex(text: &str) -> Float {
    Float::parse_radix(text, 16).unwrap()
}

fn evaluator() -> BoundEvaluator {
    BoundEvaluator::new(&VerifierConfig::default()).unwrap()
}

/// `Q_X(1) >= 1 - margin` and `Q_Y(2) >= 1 - margin`.
fn corner_region(margin: i64) -> Region {
    let mut lower = [0; 6];
    lower[0] = FIXED_POINT_ONE - margin;
    lower[4] = FIXED_POINT_ONE - margin;
    Region::new(lower, [FIXED_POINT_ONE; 6])
        .unwrap()
        .tightened()
        .unwrap()
}

/// alpha = 1/2 with all of beta on cell (0, 1).
fn corner_record() -> VerifyRecord {
    let mut beta: [Float; 9] = Default::default();
    beta[1] = hex("8");
    VerifyRecord {
        alpha: hex("0.8"),
        beta,
    }
}

#[test]
fn corner_leaf_certifies() {
    let evaluator = evaluator();
    let region = corner_region(FIXED_POINT_ONE / 64);
    let value = evaluator.certify(&region, &corner_record()).unwrap();
    // exact value 1.0504424361416958...
    assert_eq!(value.to_decimal_fixed(12, Round::Down), "1.050442436141");
    assert!(value > *evaluator.lowerbound());
}

#[test]
fn shrinking_a_region_never_weakens_its_bound() {
    let evaluator = evaluator();
    let loose = corner_region(FIXED_POINT_ONE / 32);
    let tight = corner_region(FIXED_POINT_ONE / 64);
    assert!(tight.is_within(&loose));

    let loose_value = evaluator.evaluate(&loose, &corner_record()).unwrap();
    let tight_value = evaluator.evaluate(&tight, &corner_record()).unwrap();
    assert!(tight_value >= loose_value);
    // exact value 0.6616860220110210..., below the threshold
    assert_eq!(loose_value.to_decimal_fixed(12, Round::Down), "0.661686022011");

    let err = evaluator.certify(&loose, &corner_record()).unwrap_err();
    assert!(matches!(&err, ExoError::Certification(info) if info.code == "C001"));
}

#[test]
fn zero_beta_on_the_unit_region_fails_certification() {
    // With beta = 0, D = 0 and M = 1, so value = -rate.
    let record = VerifyRecord {
        alpha: hex("0.8"),
        beta: Default::default(),
    };
    let evaluator = evaluator();
    let value = evaluator.evaluate(&Region::unit(), &record).unwrap();
    let minus_rate = -hex("0.07b28");
    assert!(value <= minus_rate);
    assert!(value > minus_rate.exact_sub(&Float::pow2(-50)));

    let err = evaluator.certify(&Region::unit(), &record).unwrap_err();
    assert_eq!(err.class(), FailureClass::Certification);
    assert_eq!(err.info().code, "C001");
}

#[test]
fn beta_out_of_range_is_rejected_before_evaluation() {
    let evaluator = evaluator();
    // An untightened region would fail enumeration if evaluation started.
    let mut lower = [0; 6];
    lower[0] = FIXED_POINT_ONE / 2;
    lower[1] = FIXED_POINT_ONE / 2 + 2;
    let region = Region::new(lower, [FIXED_POINT_ONE; 6]).unwrap();

    let mut record = corner_record();
    record.beta[7] = hex("9");
    let err = evaluator.evaluate(&region, &record).unwrap_err();
    assert_eq!(err.info().code, "S021");
    assert_eq!(err.info().context["cell"], "7");

    record.beta[7] = -hex("0.01");
    assert_eq!(evaluator.evaluate(&region, &record).unwrap_err().info().code, "S021");

    record.beta[7] = hex("8.ffffffffffffff");
    assert_ne!(evaluator.evaluate(&region, &record).unwrap_err().info().code, "S021");
}

#[test]
fn alpha_must_lie_inside_its_window() {
    let evaluator = evaluator();
    let mut record = corner_record();
    for alpha in ["0", "0.00418", "0.ffc", "1"] {
        record.alpha = hex(alpha);
        let err = evaluator.check_parameters(&record).unwrap_err();
        assert_eq!(err.info().code, "S020", "alpha {alpha}");
        assert_eq!(err.class(), FailureClass::ScriptFormat);
    }
    // 0.00419 > 1/1000 and 0.ffb < 999/1000
    for alpha in ["0.00419", "0.ffb"] {
        record.alpha = hex(alpha);
        let one_minus_alpha = evaluator.check_parameters(&record).unwrap();
        assert_eq!(one_minus_alpha.exact_add(&record.alpha), Float::one());
    }
}
