pub(crate) mod bezier;
pub(crate) mod control_point;
pub(crate) mod policy;
pub(crate) mod track;
