//! Names the IBIS-AMI standard reserves for the `Reserved_Parameters`
//! branch.

/// Every recognized reserved parameter name.
pub const RESERVED_PARAM_NAMES: &[&str] = &[
    "AMI_Version",
    "Init_Returns_Impulse",
    "GetWave_Exists",
    "Use_Init_Output",
    "Max_Init_Aggressors",
    "Ignore_Bits",
    "Resolve_Exists",
    "Model_Name",
    "Special_Param_Names",
    "Component_Name",
    "Signal_Name",
    "Rx_Decision_Time",
    "DC_Offset",
    "Rx_Use_Clock_Input",
    "Supporting_Files",
    "DLL_Path",
    "DLL_ID",
    "Tx_Jitter",
    "Tx_DCD",
    "Tx_Rj",
    "Tx_Dj",
    "Tx_Sj",
    "Tx_Sj_Frequency",
    "Rx_DCD",
    "Rx_Rj",
    "Rx_Dj",
    "Rx_Sj",
    "Rx_Clock_PDF",
    "Rx_Clock_Recovery_Mean",
    "Rx_Clock_Recovery_Rj",
    "Rx_Clock_Recovery_Dj",
    "Rx_Clock_Recovery_Sj",
    "Rx_Clock_Recovery_DCD",
    "Rx_Receiver_Sensitivity",
    "Rx_Noise",
    "Rx_GaussianNoise",
    "Rx_UniformNoise",
    "Modulation",
    "PAM4_Mapping",
    "PAM4_UpperThreshold",
    "PAM4_CenterThreshold",
    "PAM4_LowerThreshold",
    "PAM4_UpperEyeOffset",
    "PAM4_CenterEyeOffset",
    "PAM4_LowerEyeOffset",
    "Repeater_Type",
    "BCI_Protocol",
    "BCI_ID",
    "BCI_State",
    "BCI_Message_Interval_UI",
    "BCI_Training_UI",
    "BCI_Training_Mode",
    "Ts4file",
    "Tx_V",
    "Tx_R",
    "Rx_R",
];

/// Reserved parameters every model must declare.
pub const REQUIRED_RESERVED_PARAMS: &[&str] = &["Init_Returns_Impulse", "GetWave_Exists"];

/// Case-sensitive membership test.
pub fn is_reserved_param_name(name: &str) -> bool {
    RESERVED_PARAM_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_param_name("Init_Returns_Impulse"));
        assert!(is_reserved_param_name("Tx_Sj_Frequency"));
        assert!(!is_reserved_param_name("init_returns_impulse"));
        assert!(!is_reserved_param_name("tx_tap_units"));
        assert!(REQUIRED_RESERVED_PARAMS.iter().all(|n| is_reserved_param_name(n)));
    }
}
