//! 5-minute MSC counter catalog.
//!
//! Trunk-route, VoIP-route and SIP-session KPIs are computed per operator
//! suffix and grouped into families; switch-wide KPIs (CPU, SMS, CSFB,
//! SGS) are standalone and mostly globally scoped.

use crate::models::{Catalog, Formula, KpiDefinition, KpiFamily};
use crate::utils::TransformResult;

fn ratio(scale: f64) -> Formula {
    Formula::RatioOfSums { scale, complement: false }
}

pub fn catalog() -> TransformResult<Catalog> {
    let kpis = vec![
        KpiDefinition::new("CPU", ratio(1.0))
            .numerator(&["LoasACCLOAD"])
            .denominator(&["LoasNSCAN"]),
        KpiDefinition::new("SGS_UpdateLocation", ratio(100.0))
            .numerator(&["SgsNSLOCREGSGS"])
            .denominator(&["SgsNTLOCREGSGS"]),
        KpiDefinition::new("SGS_SMS_MO", ratio(100.0))
            .numerator(&["SgsNSMOSMS"])
            .denominator(&["SgsNTMOSMS"]),
        KpiDefinition::new("SGS_SMS_MT", ratio(100.0))
            .numerator(&["SgsNSMTSMS"])
            .denominator(&["SgsNTMTSMS"]),
        KpiDefinition::new("TxPaging1", ratio(100.0))
            .numerator(&["LocNLAPAG1RESUCC", "LocNLAPAG2RESUCC"])
            .denominator(&["LocNLAPAG1LOTOT"])
            .per_suffix(),
        KpiDefinition::new("TxMajLa", ratio(100.0))
            .numerator(&["LocNLALOCSUCC"])
            .denominator(&["LocNLALOCTOT"])
            .per_suffix(),
        KpiDefinition::new("TxCall_OC", ratio(100.0))
            .numerator(&["ChasNCHAFRMSUCC", "ChasNMSFRMSCCI"])
            .denominator(&["ChasNCHAFRMTOT", "ChasNMSFRMTOTI"]),
        KpiDefinition::new("TxCall_TC", ratio(100.0))
            .numerator(&["ChasNCHATOMSUCC", "ChasNMSTOMSCCO"])
            .denominator(&["ChasNCHATOMTOT", "ChasNMSTOMTOTO"]),
        KpiDefinition::new("EffAuthen_HLR", ratio(100.0))
            .numerator(&["SecNAUTFTCSUCC"])
            .denominator(&["SecNAUTFTCTOT"]),
        KpiDefinition::new("Eff_RABASN_In", ratio(100.0))
            .numerator(&["RncNRNFRMSCCI"])
            .denominator(&["RncNRNFRMTOTI"])
            .per_suffix(),
        KpiDefinition::new("Eff_RABASN_Out", ratio(100.0))
            .numerator(&["RncNRNTOMSCCO"])
            .denominator(&["RncNRNTOMTOTO"])
            .per_suffix(),
        KpiDefinition::new("TxHORNCOut", ratio(100.0))
            .numerator(&["RncNRNTORGSUCC"])
            .denominator(&["RncNRNTRRRGTOT"])
            .per_suffix(),
        KpiDefinition::new("TxHOBSCOut", ratio(100.0))
            .numerator(&["BscNBSTOHBSUCC"])
            .denominator(&["BscNBSTRHRTOT"])
            .per_suffix(),
        KpiDefinition::new("TxHOBSCIn", ratio(100.0))
            .numerator(&["BscNBSTIHBSUCC", "BscNBSTIUGHBSUCC"])
            .denominator(&["BscNBSTSHRTOT", "BscNBSTSUGHRTOT"])
            .per_suffix(),
        KpiDefinition::new("TxSms_MO", ratio(100.0))
            .numerator(&["ShmNSMSCAOSUCC"])
            .denominator(&["ShmNSMSRDOTOT"]),
        KpiDefinition::new("TxSms_MT", ratio(100.0))
            .numerator(&["ShmNSMSSRSUCC"])
            .denominator(&["ShmNSMSSMRLTOT"]),
        KpiDefinition::new("TRAF_Erlang_S", ratio(1.0))
            .numerator(&["TrunkrouteNTRALACCO"])
            .denominator(&["TrunkrouteNSCAN"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_Erlang_E", ratio(1.0))
            .numerator(&["TrunkrouteNTRALACCI"])
            .denominator(&["TrunkrouteNSCAN"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_RDT", Formula::RatioOverAdjustedCapacity { scale: 100.0 })
            .numerator(&["TrunkrouteNTRALACCO", "TrunkrouteNTRALACCI"])
            .denominator(&["TrunkrouteNSCAN"])
            .additional(&["TrunkrouteNDEV", "TrunkrouteNBLOCACC"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_CircHS", Formula::SumOverPositionalProduct { scale: 100.0 })
            .numerator(&["TrunkrouteNBLOCACC"])
            .denominator(&["TrunkrouteNSCAN", "TrunkrouteNDEV"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_ALOC_E", Formula::SumOverPositionalProduct { scale: 300.0 })
            .numerator(&["TrunkrouteNTRALACCI"])
            .denominator(&["TrunkrouteNSCAN", "TrunkrouteNANSWERSI"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_ALOC_S", Formula::SumOverPositionalProduct { scale: 300.0 })
            .numerator(&["TrunkrouteNTRALACCO"])
            .denominator(&["TrunkrouteNSCAN", "TrunkrouteNANSWERSO"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new("TRAF_FCS", Formula::CapacityMinusRatio)
            .numerator(&["TrunkrouteNBLOCACC"])
            .denominator(&["TrunkrouteNSCAN"])
            .additional(&["TrunkrouteNDEV"])
            .per_suffix()
            .family("traffic"),
        KpiDefinition::new(
            "ASR_S",
            Formula::SumOverPositionalDifference { scale: 100.0, complement: false },
        )
        .numerator(&["TrunkrouteNANSWERSO"])
        .denominator(&["TrunkrouteNCALLSO", "TrunkrouteNOVERFLOWO"])
        .per_suffix()
        .family("ASR"),
        KpiDefinition::new("ASR_E", ratio(100.0))
            .numerator(&["TrunkrouteNANSWERSI"])
            .denominator(&["TrunkrouteNCALLSI"])
            .per_suffix()
            .family("ASR"),
        KpiDefinition::new("RouteUtilizationIn", ratio(100.0))
            .numerator(&["VoiproITRALAC"])
            .denominator(&["VoiproNTRAFIND_STASIPI"])
            .per_suffix()
            .family("RouteUtilization"),
        KpiDefinition::new("RouteUtilizationOut", ratio(100.0))
            .numerator(&["VoiproOTRALAC"])
            .denominator(&["VoiproNTRAFIND_STASIPO"])
            .per_suffix()
            .family("RouteUtilization"),
        KpiDefinition::new(
            "Succ_VoIP_Seiz_Attempts",
            Formula::LinearOfSum { scale: -100.0, offset: 100.0 },
        )
        .numerator(&["VoiproIOVERFL"])
        .per_suffix()
        .family("Success"),
        KpiDefinition::new("ASR_IN", ratio(100.0))
            .numerator(&["VoiproIANSWER"])
            .denominator(&["VoiproNCALLSI"])
            .per_suffix()
            .family("ASR"),
        KpiDefinition::new("ASR_OUT", ratio(100.0))
            .numerator(&["VoiproOANSWER"])
            .denominator(&["VoiproNCALLSO"])
            .per_suffix()
            .family("ASR"),
        KpiDefinition::new("Success_SIP_IN", ratio(100.0))
            .numerator(&["SiproISUCSES"])
            .denominator(&["SiproISIPSES"])
            .per_suffix()
            .family("Success"),
        KpiDefinition::new("Success_SIP_OUT", ratio(100.0))
            .numerator(&["SiproOSUCSES"])
            .denominator(&["SiproOSIPSES"])
            .per_suffix()
            .family("Success"),
        KpiDefinition::new(
            "Invite_Req_Succ_Ratio",
            Formula::RatioOfSums { scale: 100.0, complement: true },
        )
        .numerator(&["SipnodNUSINVITE"])
        .denominator(&["SipnodNRINVITE"]),
        KpiDefinition::new("Rec_SIP_Req_Succ_Ratio", ratio(100.0))
            .numerator(&["SipnodONSIPRES"])
            .denominator(&["SipnodINSIPREQ"]),
        KpiDefinition::new("Sent_SIP_Req_Succ_Ratio", ratio(100.0))
            .numerator(&["SipnodINSIPRES"])
            .denominator(&["SipnodONSIPREQ"]),
        KpiDefinition::new("ALOC_IN", Formula::SumOverPositionalProduct { scale: 300.0 })
            .numerator(&["VoiproITRALAC"])
            .denominator(&["VoiproNSCAN", "VoiproIANSWER"])
            .per_suffix()
            .family("ALOC"),
        KpiDefinition::new("ALOC_OUT", Formula::SumOverPositionalProduct { scale: 300.0 })
            .numerator(&["VoiproOTRALAC"])
            .denominator(&["VoiproNSCAN", "VoiproOANSWER"])
            .per_suffix()
            .family("ALOC"),
        KpiDefinition::new("CSFB_MT_Eff", ratio(100.0))
            .numerator(&["CsfbNSUCCCSFB"])
            .denominator(&["CsfbNSPAG1CSFB", "CsfbNSPAG2CSFB"]),
        // CsfsbNSUCCCSFB is the counter name the elements actually emit
        KpiDefinition::new("CSFB_Call_MT", ratio(100.0))
            .numerator(&["CsfsbNSUCCCSFB"])
            .denominator(&["CsfbNSUCCCSFB", "CsfbNUNSUCCCSFB", "CsfbNUSREJCSFB"]),
        KpiDefinition::new("CSFB_Paging", ratio(100.0))
            .numerator(&["CsfbNSPAG1CSFB", "CsfbNSPAG2CSFB"])
            .denominator(&["CsfbNTPAG1CSFB"]),
        KpiDefinition::new("SGSLA_Attach_Reg", ratio(100.0))
            .numerator(&["SgslaNSLAATREGSGS"])
            .denominator(&["SgslaNTLAATREGSGS"])
            .per_suffix()
            .family("SGSLA"),
        KpiDefinition::new("SGSLA_Attach_NonReg", ratio(100.0))
            .numerator(&["SgslaNSLAATNREGSGS"])
            .denominator(&["SgslaNTLAATNREGSGS"])
            .per_suffix()
            .family("SGSLA"),
        KpiDefinition::new("SGSLA_LocUpdate_Reg", ratio(100.0))
            .numerator(&["SgslaNSLANLREGSGS"])
            .denominator(&["SgslaNTLANLREGSGS"])
            .per_suffix()
            .family("SGSLA"),
        KpiDefinition::new("SGSLA_LocUpdate_NonReg", ratio(100.0))
            .numerator(&["SgslaNSLANLNREGSGS"])
            .denominator(&["SgslaNTLANLNREGSGS"])
            .per_suffix()
            .family("SGSLA"),
    ];

    let families = vec![
        KpiFamily::new(
            "traffic",
            &[
                "TRAF_Erlang_S",
                "TRAF_Erlang_E",
                "TRAF_RDT",
                "TRAF_CircHS",
                "TRAF_ALOC_E",
                "TRAF_ALOC_S",
                "TRAF_FCS",
            ],
        ),
        KpiFamily::new("ASR", &["ASR_S", "ASR_E", "ASR_IN", "ASR_OUT"]),
        KpiFamily::new("Success", &["Success_SIP_IN", "Success_SIP_OUT", "Succ_VoIP_Seiz_Attempts"]),
        KpiFamily::new("RouteUtilization", &["RouteUtilizationIn", "RouteUtilizationOut"]),
        KpiFamily::new("ALOC", &["ALOC_IN", "ALOC_OUT"]),
        KpiFamily::new(
            "SGSLA",
            &[
                "SGSLA_Attach_Reg",
                "SGSLA_Attach_NonReg",
                "SGSLA_LocUpdate_Reg",
                "SGSLA_LocUpdate_NonReg",
            ],
        ),
    ];

    Catalog::new(kpis, families)
}
