//! Well-known GATT identifiers from the Bluetooth SIG assigned numbers.
//!
//! Tables are sorted by identifier and searched with binary search.

pub(crate) const SERVICES: &[(u32, &str)] = &[
    (0x1800, "GenericAccess"),
    (0x1801, "GenericAttribute"),
    (0x1802, "ImmediateAlert"),
    (0x1803, "LinkLoss"),
    (0x1804, "TxPower"),
    (0x1805, "CurrentTime"),
    (0x1806, "ReferenceTimeUpdate"),
    (0x1807, "NextDSTChange"),
    (0x1808, "Glucose"),
    (0x1809, "HealthThermometer"),
    (0x180a, "DeviceInformation"),
    (0x180d, "HeartRate"),
    (0x180e, "PhoneAlertStatus"),
    (0x180f, "Battery"),
    (0x1810, "BloodPressure"),
    (0x1811, "AlertNotification"),
    (0x1812, "HumanInterfaceDevice"),
    (0x1813, "ScanParameters"),
    (0x1814, "RunningSpeedAndCadence"),
    (0x1815, "AutomationIO"),
    (0x1816, "CyclingSpeedAndCadence"),
    (0x1818, "CyclingPower"),
    (0x1819, "LocationAndNavigation"),
    (0x181a, "EnvironmentalSensing"),
    (0x181b, "BodyComposition"),
    (0x181c, "UserData"),
    (0x181d, "WeightScale"),
    (0x181e, "BondManagement"),
    (0x181f, "ContinuousGlucoseMonitoring"),
    (0x1820, "InternetProtocolSupport"),
    (0x1821, "IndoorPositioning"),
    (0x1822, "PulseOximeter"),
    (0x1823, "HTTPProxy"),
    (0x1824, "TransportDiscovery"),
    (0x1825, "ObjectTransfer"),
    (0x1826, "FitnessMachine"),
    (0x1827, "MeshProvisioning"),
    (0x1828, "MeshProxy"),
    (0x1829, "ReconnectionConfiguration"),
    (0x183a, "InsulinDelivery"),
    (0x183b, "BinarySensor"),
    (0x183c, "EmergencyConfiguration"),
    (0xffe0, "HM10"),
];

pub(crate) const CHARACTERISTICS: &[(u32, &str)] = &[
    (0x2a00, "DeviceName"),
    (0x2a01, "Appearance"),
    (0x2a02, "PeripheralPrivacyFlag"),
    (0x2a03, "ReconnectionAddress"),
    (0x2a04, "PeripheralPreferredConnectionParameters"),
    (0x2a05, "ServiceChanged"),
    (0x2a06, "AlertLevel"),
    (0x2a07, "TxPowerLevel"),
    (0x2a08, "DateTime"),
    (0x2a09, "DayOfWeek"),
    (0x2a0a, "DayDateTime"),
    (0x2a0c, "ExactTime256"),
    (0x2a0d, "DstOffset"),
    (0x2a0e, "TimeZone"),
    (0x2a0f, "LocalTimeInformation"),
    (0x2a11, "TimeWithDst"),
    (0x2a12, "TimeAccuracy"),
    (0x2a13, "TimeSource"),
    (0x2a14, "ReferenceTimeInformation"),
    (0x2a16, "TimeUpdateControlPoint"),
    (0x2a17, "TimeUpdateState"),
    (0x2a18, "GlucoseMeasurement"),
    (0x2a19, "BatteryLevel"),
    (0x2a1c, "TemperatureMeasurement"),
    (0x2a1d, "TemperatureType"),
    (0x2a1e, "IntermediateTemperature"),
    (0x2a21, "MeasurementInterval"),
    (0x2a22, "BootKeyboardInputReport"),
    (0x2a23, "SystemId"),
    (0x2a24, "ModelNumberString"),
    (0x2a25, "SerialNumberString"),
    (0x2a26, "FirmwareRevisionString"),
    (0x2a27, "HardwareRevisionString"),
    (0x2a28, "SoftwareRevisionString"),
    (0x2a29, "ManufacturerNameString"),
    (0x2a2a, "Ieee11073_20601RegulatoryCertificationDataList"),
    (0x2a2b, "CurrentTime"),
    (0x2a31, "ScanRefresh"),
    (0x2a32, "BootKeyboardOutputReport"),
    (0x2a33, "BootMouseInputReport"),
    (0x2a34, "GlucoseMeasurementContext"),
    (0x2a35, "BloodPressureMeasurement"),
    (0x2a36, "IntermediateCuffPressure"),
    (0x2a37, "HeartRateMeasurement"),
    (0x2a38, "BodySensorLocation"),
    (0x2a39, "HeartRateControlPoint"),
    (0x2a3f, "AlertStatus"),
    (0x2a40, "RingerControlPoint"),
    (0x2a41, "RingerSetting"),
    (0x2a42, "AlertCategoryIdBitMask"),
    (0x2a43, "AlertCategoryId"),
    (0x2a44, "AlertNotificationControlPoint"),
    (0x2a45, "UnreadAlertStatus"),
    (0x2a46, "NewAlert"),
    (0x2a47, "SupportedNewAlertCategory"),
    (0x2a48, "SupportedUnreadAlertCategory"),
    (0x2a49, "BloodPressureFeature"),
    (0x2a4a, "HidInformation"),
    (0x2a4b, "ReportMap"),
    (0x2a4c, "HidControlPoint"),
    (0x2a4d, "Report"),
    (0x2a4e, "ProtocolMode"),
    (0x2a4f, "ScanIntervalWindow"),
    (0x2a50, "PnPId"),
    (0x2a51, "GlucoseFeature"),
    (0x2a52, "RecordAccessControlPoint"),
    (0x2a53, "RscMeasurement"),
    (0x2a54, "RscFeature"),
    (0x2a55, "ScControlPoint"),
    (0x2a5a, "Aggregate"),
    (0x2a5b, "CscMeasurement"),
    (0x2a5c, "CscFeature"),
    (0x2a5d, "SensorLocation"),
    (0x2a5e, "PlxSpotCheckMeasurement"),
    (0x2a5f, "PlxContinuousMeasurement"),
    (0x2a60, "PlxFeatures"),
    (0x2a63, "CyclingPowerMeasurement"),
    (0x2a64, "CyclingPowerVector"),
    (0x2a65, "CyclingPowerFeature"),
    (0x2a66, "CyclingPowerControlPoint"),
    (0x2a67, "LocationAndSpeed"),
    (0x2a68, "Navigation"),
    (0x2a69, "PositionQuality"),
    (0x2a6a, "LnFeature"),
    (0x2a6b, "LnControlPoint"),
    (0x2a6c, "Elevation"),
    (0x2a6d, "Pressure"),
    (0x2a6e, "Temperature"),
    (0x2a6f, "Humidity"),
    (0x2a70, "TrueWindSpeed"),
    (0x2a71, "TrueWindDirection"),
    (0x2a72, "ApparentWindSpeed"),
    (0x2a73, "ApparentWindDirection"),
    (0x2a74, "GustFactor"),
    (0x2a75, "PollenConcentration"),
    (0x2a76, "UvIndex"),
    (0x2a77, "Irradiance"),
    (0x2a78, "Rainfall"),
    (0x2a79, "WindChill"),
    (0x2a7a, "HeatIndex"),
    (0x2a7b, "DewPoint"),
    (0x2a7d, "DescriptorValueChanged"),
    (0x2a7e, "AerobicHeartRateLowerLimit"),
    (0x2a7f, "AerobicThreshold"),
    (0x2a80, "Age"),
    (0x2a81, "AnaerobicHeartRateLowerLimit"),
    (0x2a82, "AnaerobicHeartRateUpperLimit"),
    (0x2a83, "AnaerobicThreshold"),
    (0x2a84, "AerobicHeartRateUpperLimit"),
    (0x2a85, "DateOfBirth"),
    (0x2a86, "DateOfThresholdAssessment"),
    (0x2a87, "EmailAddress"),
    (0x2a88, "FatBurnHeartRateLowerLimit"),
    (0x2a89, "FatBurnHeartRateUpperLimit"),
    (0x2a8a, "FirstName"),
    (0x2a8b, "FiveZoneHeartRateLimits"),
    (0x2a8c, "Gender"),
    (0x2a8d, "HeartRateMax"),
    (0x2a8e, "Height"),
    (0x2a8f, "HipCircumference"),
    (0x2a90, "LastName"),
    (0x2a91, "MaximumRecommendedHeartRate"),
    (0x2a92, "RestingHeartRate"),
    (0x2a93, "SportTypeForAerobicAndAnaerobicThresholds"),
    (0x2a94, "ThreeZoneHeartRateLimits"),
    (0x2a95, "TwoZoneHeartRateLimits"),
    (0x2a96, "Vo2Max"),
    (0x2a97, "WaistCircumference"),
    (0x2a98, "Weight"),
    (0x2a99, "DatabaseChangeIncrement"),
    (0x2a9a, "UserIndex"),
    (0x2a9b, "BodyCompositionFeature"),
    (0x2a9c, "BodyCompositionMeasurement"),
    (0x2a9d, "WeightMeasurement"),
    (0x2a9e, "WeightScaleFeature"),
    (0x2a9f, "UserControlPoint"),
    (0x2aa0, "MagneticFluxDensity2D"),
    (0x2aa1, "MagneticFluxDensity3D"),
    (0x2aa2, "Language"),
    (0x2aa3, "BarometricPressureTrend"),
    (0x2aa4, "BondManagementControlPoint"),
    (0x2aa5, "BondManagementFeature"),
    (0x2aa6, "CentralAddressResolution"),
    (0x2aa7, "CgmMeasurement"),
    (0x2aa8, "CgmFeature"),
    (0x2aa9, "CgmStatus"),
    (0x2aaa, "CgmSessionStartTime"),
    (0x2aab, "CgmSessionRunTime"),
    (0x2aac, "CgmSpecificOpsControlPoint"),
    (0x2aad, "IndoorPositioningConfiguration"),
    (0x2aae, "Latitude"),
    (0x2aaf, "Longitude"),
    (0x2ab0, "LocalNorthCoordinate"),
    (0x2ab1, "LocalEastCoordinate"),
    (0x2ab2, "FloorNumber"),
    (0x2ab3, "Altitude"),
    (0x2ab4, "Uncertainty"),
    (0x2ab5, "LocationName"),
    (0x2ab6, "Uri"),
    (0x2ab7, "HttpHeaders"),
    (0x2ab8, "HttpStatusCode"),
    (0x2ab9, "HttpEntityBody"),
    (0x2aba, "HttpControlPoint"),
    (0x2abb, "HttpsSecurity"),
    (0x2abc, "TdsControlPoint"),
    (0x2abd, "OtsFeature"),
    (0x2abe, "ObjectName"),
    (0x2abf, "ObjectType"),
    (0x2ac0, "ObjectSize"),
    (0x2ac1, "ObjectFirstCreated"),
    (0x2ac2, "ObjectLastModified"),
    (0x2ac3, "ObjectId"),
    (0x2ac4, "ObjectProperties"),
    (0x2ac5, "ObjectActioncontrolPoint"),
    (0x2ac6, "ObjectListControlPoint"),
    (0x2ac7, "ObjectListFilter"),
    (0x2ac8, "ObjectChanged"),
    (0x2ac9, "ResolvablePrivateAddressOnly"),
    (0x2aca, "Unspecified"),
    (0x2acb, "DirectoryListing"),
    (0x2acc, "FitnessMachineFeature"),
    (0x2acd, "TreadmillData"),
    (0x2ace, "CrossTrainerData"),
    (0x2acf, "StepClimberData"),
    (0x2ad0, "StairClimberData"),
    (0x2ad1, "RowerData"),
    (0x2ad2, "IndoorBikeData"),
    (0x2ad3, "TrainingStatus"),
    (0x2ad4, "SupportedSpeedRange"),
    (0x2ad5, "SupportedInclinationRange"),
    (0x2ad6, "SupportedResistanceLevelRange"),
    (0x2ad7, "SupportedHeartRateRange"),
    (0x2ad8, "SupportedPowerRange"),
    (0x2ad9, "FitnessMachineControlPoint"),
    (0x2ada, "FitnessMachineStatus"),
    (0x2adb, "MeshProvisioningDataIn"),
    (0x2adc, "MeshProvisioningDataOut"),
    (0x2add, "MeshProxyDataIn"),
    (0x2ade, "MeshProxyDataOut"),
    (0x2ae0, "AverageCurrent"),
    (0x2ae1, "AverageVoltage"),
    (0x2ae2, "Boolean"),
    (0x2ae3, "ChromaticDistanceFromPlanckian"),
    (0x2ae4, "ChromaticityCoordinates"),
    (0x2ae5, "ChromaticityInCctAndDuvValues"),
    (0x2ae6, "ChromaticityTolerance"),
    (0x2ae7, "Cie13_3_1995ColorRenderingIndex"),
    (0x2ae8, "Coefficient"),
    (0x2ae9, "CorrelatedColorTemperature"),
    (0x2aea, "Count16"),
    (0x2aeb, "Count24"),
    (0x2aec, "CountryCode"),
    (0x2aed, "DateUtc"),
    (0x2aee, "ElectricCurrent"),
    (0x2aef, "ElectricCurrentRange"),
    (0x2af0, "ElectricCurrentSpecification"),
    (0x2af1, "ElectricCurrentStatistics"),
    (0x2af2, "Energy"),
    (0x2af3, "EnergyInAPeriodOfDay"),
    (0x2af4, "EventStatistics"),
    (0x2af5, "FixedString16"),
    (0x2af6, "FixedString24"),
    (0x2af7, "FixedString36"),
    (0x2af8, "FixedString8"),
    (0x2af9, "GenericLevel"),
    (0x2afa, "GlobalTradeItemNumber"),
    (0x2afb, "Illuminance"),
    (0x2afc, "LuminousEfficacy"),
    (0x2afd, "LuminousEnergy"),
    (0x2afe, "LuminousExposure"),
    (0x2aff, "LuminousFlux"),
    (0x2b00, "LuminousFluxRange"),
    (0x2b01, "LuminousIntensity"),
    (0x2b02, "MassFlow"),
    (0x2b03, "PerceivedLightness"),
    (0x2b04, "Percentage8"),
    (0x2b05, "Power"),
    (0x2b06, "PowerSpecification"),
    (0x2b07, "RelativeRuntimeInACurrentRange"),
    (0x2b08, "RelativeRuntimeInAGenericLevelRange"),
    (0x2b09, "RelativeValueInAVoltageRange"),
    (0x2b0a, "RelativeValueInAnIlluminanceRange"),
    (0x2b0b, "RelativeValueInAPeriodOfDay"),
    (0x2b0c, "RelativeValueInATemperatureRange"),
    (0x2b0d, "Temperature8"),
    (0x2b0e, "Temperature8InAPeriodOfDay"),
    (0x2b0f, "Temperature8Statistics"),
    (0x2b10, "TemperatureRange"),
    (0x2b11, "TemperatureStatistics"),
    (0x2b12, "TimeDecihour8"),
    (0x2b13, "TimeExponential8"),
    (0x2b14, "TimeHour24"),
    (0x2b15, "TimeMillisecond24"),
    (0x2b16, "TimeSecond16"),
    (0x2b17, "TimeSecond8"),
    (0x2b18, "Voltage"),
    (0x2b19, "VoltageSpecification"),
    (0x2b1a, "VoltageStatistics"),
    (0x2b1b, "VolumeFlow"),
    (0x2b1c, "ChromaticityCoordinate"),
    (0x2b1d, "RcFeature"),
    (0x2b1e, "RcSettings"),
    (0x2b1f, "ReconnectionConfigurationControlPoint"),
    (0x2b20, "IddStatusChanged"),
    (0x2b21, "IddStatus"),
    (0x2b22, "IddAnnunciationStatus"),
    (0x2b23, "IddFeatures"),
    (0x2b24, "IddStatusReaderControlPoint"),
    (0x2b25, "IddCommandControlPoint"),
    (0x2b26, "IddCommandData"),
    (0x2b27, "IddRecordAccessControlPoint"),
    (0x2b28, "IddHistoryData"),
    (0x2b29, "ClientSupportedFeatures"),
    (0x2b2a, "DatabaseHash"),
    (0x2b2b, "BssControlPoint"),
    (0x2b2c, "BssResponse"),
    (0x2b2d, "EmergencyId"),
    (0x2b2e, "EmergencyText"),
    (0x2b3a, "ServerSupportedFeatures"),
    (0xffe1, "HM10"),
];
