//! `gcadapterctl descriptor`

use gcadapter_hid_wup028_protocol::inject_descriptor;

use crate::output;

pub fn execute(json: bool) {
    output::print_descriptor(inject_descriptor(), json);
}
